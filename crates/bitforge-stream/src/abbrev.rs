//! Abbreviation model: declarative operand layouts for compact records.
//!
//! An abbreviation has two encode passes: its own definition (emitted once
//! by `DEFINE_ABBREV`) and a value encoded against it (one per record).

use crate::bit_writer::BitWriter;
use crate::error::{Error, Result};

const IS_LITERAL_WIDTH: u32 = 1;
const LITERAL_VALUE_WIDTH: u32 = 8;
const ENCODING_WIDTH: u32 = 3;
const EXTRA_WIDTH: u32 = 5;
const OPERAND_COUNT_WIDTH: u32 = 5;
const ARRAY_LENGTH_WIDTH: u32 = 6;
const BLOB_LENGTH_WIDTH: u32 = 6;
const CHAR6_WIDTH: u32 = 6;
const DWORD_BITS: u32 = 32;

const FIXED_ENC: u32 = 1;
const VBR_ENC: u32 = 2;
const ARRAY_ENC: u32 = 3;
const CHAR6_ENC: u32 = 4;
const BLOB_ENC: u32 = 5;

/// One operand of an abbreviation layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Implicit constant; consumes no value at record-encode time.
    Literal(u64),
    /// Raw bit field of the given width.
    Fixed(u32),
    /// Variable bit-rate field of the given group width.
    Vbr(u32),
    /// VBR6 element count followed by that many elements.
    ///
    /// The element may not itself be a literal, array, or blob.
    Array(Box<Operand>),
    /// 6-bit code restricted to `[a-zA-Z0-9._]`.
    Char6,
    /// VBR6 byte length, then 32-bit-aligned raw bytes, then re-alignment.
    Blob,
}

/// A value supplied for one non-literal abbreviation operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    Scalar(u64),
    Array(Vec<u64>),
    Blob(Vec<u8>),
}

impl RecordValue {
    /// Array of byte values, for `Array(Char6)` and `Array(Fixed(8))`
    /// operands carrying identifier or path text.
    pub fn chars(s: &str) -> Self {
        RecordValue::Array(s.bytes().map(u64::from).collect())
    }

    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        RecordValue::Blob(bytes.into())
    }
}

impl From<u64> for RecordValue {
    fn from(value: u64) -> Self {
        RecordValue::Scalar(value)
    }
}

impl From<Vec<u64>> for RecordValue {
    fn from(values: Vec<u64>) -> Self {
        RecordValue::Array(values)
    }
}

/// A named abbreviation: an ordered list of operand layouts.
///
/// Names exist only on the encoder side; the wire knows abbreviations by
/// the numeric id assigned when they enter a block's scope.
#[derive(Debug, Clone)]
pub struct Abbr {
    name: String,
    operands: Vec<Operand>,
}

impl Abbr {
    pub fn new(name: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            name: name.into(),
            operands,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reject operand layouts the format cannot express.
    pub(crate) fn validate(&self) -> Result<()> {
        for operand in &self.operands {
            if let Operand::Array(elem) = operand
                && matches!(**elem, Operand::Literal(_) | Operand::Array(_) | Operand::Blob)
            {
                return Err(Error::BadArrayElement);
            }
        }
        Ok(())
    }

    /// Emit the `DEFINE_ABBREV` payload: flat operand count, then each
    /// operand as a literal flag + value, or an encoding tag + extra.
    pub(crate) fn write_definition(&self, writer: &mut BitWriter) -> Result<()> {
        writer.write_vbr(self.flat_operand_count(), OPERAND_COUNT_WIDTH)?;
        for operand in &self.operands {
            Self::define_operand(operand, writer)?;
        }
        Ok(())
    }

    /// Encode `values` against this layout. Literal operands are skipped:
    /// their value is fixed by the definition and never re-emitted.
    pub(crate) fn write_value(&self, writer: &mut BitWriter, values: &[RecordValue]) -> Result<()> {
        let consumed = self
            .operands
            .iter()
            .filter(|op| !matches!(op, Operand::Literal(_)))
            .count();
        if consumed != values.len() {
            return Err(Error::RecordArity {
                name: self.name.clone(),
                expected: consumed,
                got: values.len(),
            });
        }

        let mut next = values.iter();
        for operand in &self.operands {
            if matches!(operand, Operand::Literal(_)) {
                continue;
            }
            // `next` cannot run dry: arity was checked above.
            if let Some(value) = next.next() {
                Self::encode_operand(operand, writer, value)?;
            }
        }
        Ok(())
    }

    fn define_operand(operand: &Operand, writer: &mut BitWriter) -> Result<()> {
        match operand {
            Operand::Literal(value) => {
                writer.write_bits(1, IS_LITERAL_WIDTH)?;
                writer.write_vbr(*value, LITERAL_VALUE_WIDTH)?;
                return Ok(());
            }
            _ => writer.write_bits(0, IS_LITERAL_WIDTH)?,
        }
        match operand {
            Operand::Fixed(width) => {
                writer.write_bits(FIXED_ENC, ENCODING_WIDTH)?;
                writer.write_vbr(*width as u64, EXTRA_WIDTH)?;
            }
            Operand::Vbr(width) => {
                writer.write_bits(VBR_ENC, ENCODING_WIDTH)?;
                writer.write_vbr(*width as u64, EXTRA_WIDTH)?;
            }
            Operand::Array(elem) => {
                writer.write_bits(ARRAY_ENC, ENCODING_WIDTH)?;
                Self::define_operand(elem, writer)?;
            }
            Operand::Char6 => writer.write_bits(CHAR6_ENC, ENCODING_WIDTH)?,
            Operand::Blob => writer.write_bits(BLOB_ENC, ENCODING_WIDTH)?,
            Operand::Literal(_) => unreachable!("handled above"),
        }
        Ok(())
    }

    fn encode_operand(operand: &Operand, writer: &mut BitWriter, value: &RecordValue) -> Result<()> {
        match (operand, value) {
            (Operand::Fixed(width), RecordValue::Scalar(v)) => {
                writer.write_bits(*v as u32, *width)
            }
            (Operand::Vbr(width), RecordValue::Scalar(v)) => writer.write_vbr(*v, *width),
            (Operand::Char6, RecordValue::Scalar(v)) => {
                writer.write_bits(char6_code(*v)?, CHAR6_WIDTH)
            }
            (Operand::Array(elem), RecordValue::Array(items)) => {
                writer.write_vbr(items.len() as u64, ARRAY_LENGTH_WIDTH)?;
                for item in items {
                    Self::encode_operand(elem, writer, &RecordValue::Scalar(*item))?;
                }
                Ok(())
            }
            (Operand::Blob, RecordValue::Blob(bytes)) => {
                writer.write_vbr(bytes.len() as u64, BLOB_LENGTH_WIDTH)?;
                writer.align(DWORD_BITS);
                for byte in bytes {
                    writer.write_bits(*byte as u32, 8)?;
                }
                writer.align(DWORD_BITS);
                Ok(())
            }
            (Operand::Fixed(_) | Operand::Vbr(_) | Operand::Char6, _) => {
                Err(Error::RecordValueKind { expected: "scalar" })
            }
            (Operand::Array(_), _) => Err(Error::RecordValueKind { expected: "array" }),
            (Operand::Blob, _) => Err(Error::RecordValueKind { expected: "blob" }),
            (Operand::Literal(_), _) => unreachable!("literals are skipped by write_value"),
        }
    }

    /// Operand count as written on the wire: array elements count too.
    fn flat_operand_count(&self) -> u64 {
        fn count(operand: &Operand) -> u64 {
            match operand {
                Operand::Array(elem) => 1 + count(elem),
                _ => 1,
            }
        }
        self.operands.iter().map(count).sum()
    }
}

/// Map an ASCII byte value to its char6 code.
fn char6_code(value: u64) -> Result<u32> {
    let code = match value {
        v @ 0x61..=0x7a => v - 0x61,      // 'a'..'z' -> 0..25
        v @ 0x41..=0x5a => v - 0x41 + 26, // 'A'..'Z' -> 26..51
        v @ 0x30..=0x39 => v - 0x30 + 52, // '0'..'9' -> 52..61
        0x2e => 62,                       // '.'
        0x5f => 63,                       // '_'
        other => return Err(Error::Char6(other)),
    };
    Ok(code as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char6_alphabet() {
        assert_eq!(char6_code(b'a' as u64).unwrap(), 0);
        assert_eq!(char6_code(b'z' as u64).unwrap(), 25);
        assert_eq!(char6_code(b'A' as u64).unwrap(), 26);
        assert_eq!(char6_code(b'Z' as u64).unwrap(), 51);
        assert_eq!(char6_code(b'0' as u64).unwrap(), 52);
        assert_eq!(char6_code(b'9' as u64).unwrap(), 61);
        assert_eq!(char6_code(b'.' as u64).unwrap(), 62);
        assert_eq!(char6_code(b'_' as u64).unwrap(), 63);
        assert_eq!(char6_code(b'-' as u64), Err(Error::Char6(0x2d)));
    }

    #[test]
    fn flat_count_recurses_into_arrays() {
        let abbr = Abbr::new(
            "source",
            vec![
                Operand::Literal(16),
                Operand::Array(Box::new(Operand::Char6)),
            ],
        );
        assert_eq!(abbr.flat_operand_count(), 3);
    }

    #[test]
    fn array_of_blob_is_rejected() {
        let abbr = Abbr::new("bad", vec![Operand::Array(Box::new(Operand::Blob))]);
        assert_eq!(abbr.validate(), Err(Error::BadArrayElement));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let abbr = Abbr::new("pair", vec![Operand::Literal(1), Operand::Vbr(6)]);
        let mut writer = BitWriter::new();
        let err = abbr
            .write_value(&mut writer, &[1u64.into(), 2u64.into()])
            .unwrap_err();
        assert!(matches!(err, Error::RecordArity { expected: 1, got: 2, .. }));
    }
}
