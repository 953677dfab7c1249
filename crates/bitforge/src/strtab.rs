//! Module string table: symbol names live here as one concatenated blob,
//! and records reference them by offset and length.

use bitforge_stream::{Abbr, BitStream, Operand, RecordValue};
use indexmap::IndexMap;

use crate::codes::{block_id, strtab_code};
use crate::error::Result;

const ABBREV_ID_WIDTH: u32 = 3;

/// Slice of the string table: what a record carries instead of the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrtabRef {
    pub offset: u64,
    pub len: u64,
}

#[derive(Debug, Default)]
pub struct Strtab {
    entries: IndexMap<String, StrtabRef>,
    size: u64,
}

impl Strtab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name. Repeated names share one slice.
    pub fn add(&mut self, name: &str) -> StrtabRef {
        if let Some(entry) = self.entries.get(name) {
            return *entry;
        }
        let entry = StrtabRef {
            offset: self.size,
            len: name.len() as u64,
        };
        self.size += entry.len;
        self.entries.insert(name.to_owned(), entry);
        entry
    }

    /// Emit the STRTAB block: a single blob record holding every interned
    /// name back to back. An empty table emits no block at all.
    pub fn build(&self, stream: &mut BitStream) -> Result<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let mut bytes = Vec::with_capacity(self.size as usize);
        for name in self.entries.keys() {
            bytes.extend_from_slice(name.as_bytes());
        }

        stream.enter_block(block_id::STRTAB, ABBREV_ID_WIDTH)?;
        stream.define_abbr(Abbr::new(
            "blob",
            vec![Operand::Literal(strtab_code::BLOB), Operand::Blob],
        ))?;
        stream.write_record("blob", &[RecordValue::blob(bytes)])?;
        stream.end_block()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_cumulative() {
        let mut strtab = Strtab::new();
        assert_eq!(strtab.add("main"), StrtabRef { offset: 0, len: 4 });
        assert_eq!(strtab.add("puts"), StrtabRef { offset: 4, len: 4 });
        assert_eq!(strtab.add("x"), StrtabRef { offset: 8, len: 1 });
    }

    #[test]
    fn repeated_names_share_a_slice() {
        let mut strtab = Strtab::new();
        let first = strtab.add("dup");
        assert_eq!(strtab.add("other"), StrtabRef { offset: 3, len: 5 });
        assert_eq!(strtab.add("dup"), first);
    }
}
