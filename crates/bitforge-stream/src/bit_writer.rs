//! Bit packing on top of the byte writer.
//!
//! Fields of 1..=32 bits accumulate in a pending dword that is flushed to
//! the byte writer whenever it fills. Writes that straddle the accumulator
//! boundary are split transparently.

use crate::byte_writer::{ByteWriter, Reservation};
use crate::error::{Error, Result};

const BYTE_BITS: u32 = 8;
const DWORD_BITS: u32 = 32;

/// Bit-granular writer with a pending 32-bit accumulator.
#[derive(Debug, Default)]
pub struct BitWriter {
    writer: ByteWriter,
    /// Pending accumulator.
    dword: u32,
    /// Bits already placed in the accumulator, 0..32.
    bit_off: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole bytes flushed so far (excludes pending accumulator bits).
    #[inline]
    pub fn offset(&self) -> usize {
        self.writer.offset()
    }

    /// Total bits written so far, pending accumulator included.
    #[inline]
    pub fn bit_offset(&self) -> usize {
        self.writer.offset() * BYTE_BITS as usize + self.bit_off as usize
    }

    /// Write the low `width` bits of `value`, low bits first.
    ///
    /// `width` 0 is a no-op; widths above 32 are an error. Bits of `value`
    /// above `width` are masked off.
    pub fn write_bits(&mut self, value: u32, width: u32) -> Result<()> {
        if width > DWORD_BITS {
            return Err(Error::InvalidBitCount(width));
        }
        self.push_bits(value, width);
        Ok(())
    }

    #[inline]
    pub fn write_byte(&mut self, value: u8) {
        self.push_bits(value as u32, 8);
    }

    #[inline]
    pub fn write_word(&mut self, value: u16) {
        self.push_bits(value as u32, 16);
    }

    #[inline]
    pub fn write_dword(&mut self, value: u32) {
        self.push_bits(value, 32);
    }

    /// Zero-pad up to the next multiple of `bits`.
    pub fn align(&mut self, bits: u32) {
        debug_assert!(bits.is_power_of_two() && bits <= DWORD_BITS);
        let pad = (bits - self.bit_off % bits) % bits;
        self.push_bits(0, pad);
    }

    /// Variable bit-rate integer: groups of `width - 1` value bits, low
    /// group first, high bit of each group the continuation flag.
    pub fn write_vbr(&mut self, value: u64, width: u32) -> Result<()> {
        if !(2..=DWORD_BITS).contains(&width) {
            return Err(Error::VbrWidth(width));
        }
        let group_bits = width - 1;
        let mask = (1u64 << group_bits) - 1;
        let cont = 1u64 << group_bits;

        let mut rest = value;
        while rest > mask {
            self.push_bits((cont | (rest & mask)) as u32, width);
            rest >>= group_bits;
        }
        self.push_bits(rest as u32, width);
        Ok(())
    }

    /// Reserve `bits` (a multiple of 8) for a later byte-level patch.
    ///
    /// The writer must be byte-aligned; any whole bytes pending in the
    /// accumulator are flushed first so the reservation lands in the byte
    /// buffer directly.
    pub fn reserve(&mut self, bits: u32) -> Result<Reservation> {
        if bits % BYTE_BITS != 0 {
            return Err(Error::PartialByteReservation(bits));
        }
        if self.bit_off % BYTE_BITS != 0 {
            return Err(Error::UnalignedReservation);
        }
        self.flush();
        Ok(self.writer.reserve((bits / BYTE_BITS) as usize))
    }

    /// Patch a reserved dword window.
    pub fn resolve_dword(&mut self, reservation: Reservation, value: u32) -> Result<()> {
        self.writer.resolve_dword(reservation, value)
    }

    /// Flush the pending accumulator and finalize the byte buffer.
    pub fn end(mut self) -> Result<Vec<u8>> {
        self.align(BYTE_BITS);
        self.flush();
        self.writer.end()
    }

    fn push_bits(&mut self, value: u32, width: u32) {
        debug_assert!(width <= DWORD_BITS);
        if width == 0 {
            return;
        }

        let room = DWORD_BITS - self.bit_off;
        if room < width {
            // Split on the accumulator boundary.
            let mask = (1u32 << room) - 1;
            self.push_bits(value & mask, room);
            self.push_bits(value >> room, width - room);
            return;
        }

        let mask = if width == DWORD_BITS {
            u32::MAX
        } else {
            (1u32 << width) - 1
        };
        self.dword |= (value & mask) << self.bit_off;
        self.bit_off += width;

        if self.bit_off == DWORD_BITS {
            self.writer.write_dword(self.dword);
            self.dword = 0;
            self.bit_off = 0;
        }
    }

    /// Write out the whole bytes sitting in the accumulator.
    ///
    /// Callers align to a byte boundary first; 1..=3 leftover bytes go out
    /// as a byte, a word, or a byte then a word.
    fn flush(&mut self) {
        debug_assert_eq!(self.bit_off % BYTE_BITS, 0);
        match self.bit_off {
            0 => {}
            8 => self.writer.write_byte((self.dword & 0xff) as u8),
            16 => self.writer.write_word((self.dword & 0xffff) as u16),
            24 => {
                self.writer.write_byte((self.dword & 0xff) as u8);
                self.writer.write_word(((self.dword >> 8) & 0xffff) as u16);
            }
            _ => unreachable!("accumulator holds at most 24 whole bytes of bits"),
        }
        self.dword = 0;
        self.bit_off = 0;
    }
}
