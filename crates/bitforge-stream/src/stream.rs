//! The bitstream container protocol: magic, blocks, abbreviation scopes,
//! records.
//!
//! Layout of a stream: a 4-byte magic, then a sequence of blocks. A block
//! opens with `ENTER_SUBBLOCK`, declares the abbreviation-id width of its
//! contents, and carries its length in dwords right after the header so a
//! reader can skip it. The length is only known once the block closes, so
//! it goes through a byte-writer reservation.

use indexmap::IndexMap;

use crate::abbrev::{Abbr, RecordValue};
use crate::bit_writer::BitWriter;
use crate::block::{Frame, MAX_ABBREV_ID_WIDTH, MIN_ABBREV_ID_WIDTH};
use crate::error::{Error, Result};

/// Abbreviations to register in the BLOCKINFO block, keyed by the id of the
/// block they apply to. Iteration order is emission order.
pub type BlockInfo = IndexMap<u64, Vec<Abbr>>;

const MAGIC: u32 = 0xdec04342;

const ROOT_ABBREV_ID_WIDTH: u32 = 2;
const BLOCK_ID_WIDTH: u32 = 8;
const NEW_ABBREV_ID_WIDTH_WIDTH: u32 = 4;
const UNABBREV_OP_WIDTH: u32 = 6;

const END_BLOCK: u64 = 0;
const ENTER_SUBBLOCK: u64 = 1;
const DEFINE_ABBREV: u64 = 2;
const UNABBREV_RECORD: u64 = 3;

const BLOCKINFO_BLOCK_ID: u64 = 0;
const SETBID: u64 = 1;

const DWORD_BITS: u32 = 32;
const DWORD_BYTES: usize = 4;

/// Writer for one bitstream container.
///
/// Single-use: [`BitStream::end`] consumes the stream, and any error leaves
/// it unusable for further output (the container has no way to back out
/// partially written structure).
#[derive(Debug)]
pub struct BitStream {
    writer: BitWriter,
    stack: Vec<Frame>,
    /// BLOCKINFO registry; blocks entered later inherit their slice of it.
    info: BlockInfo,
    info_written: bool,
}

impl BitStream {
    pub fn new() -> Self {
        let mut writer = BitWriter::new();
        writer.write_dword(MAGIC);
        Self {
            writer,
            stack: Vec::new(),
            info: BlockInfo::default(),
            info_written: false,
        }
    }

    /// Bytes flushed so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.writer.offset()
    }

    /// Open a block. Records and abbreviations inside it use
    /// `abbrev_id_width`-bit abbreviation ids.
    pub fn enter_block(&mut self, block_id: u64, abbrev_id_width: u32) -> Result<()> {
        if !(MIN_ABBREV_ID_WIDTH..=MAX_ABBREV_ID_WIDTH).contains(&abbrev_id_width) {
            return Err(Error::AbbrevIdWidth(abbrev_id_width));
        }

        self.write_abbrev_id(ENTER_SUBBLOCK)?;
        self.writer.write_vbr(block_id, BLOCK_ID_WIDTH)?;
        self.writer
            .write_vbr(abbrev_id_width as u64, NEW_ABBREV_ID_WIDTH_WIDTH)?;
        self.writer.align(DWORD_BITS);

        let length = self.writer.reserve(DWORD_BITS)?;
        let start = self.writer.offset();

        let seed = self.info.get(&block_id).cloned().unwrap_or_default();
        self.stack
            .push(Frame::new(block_id, abbrev_id_width, start, length, seed));
        Ok(())
    }

    /// Close the innermost block and patch its length.
    pub fn end_block(&mut self) -> Result<()> {
        if self.stack.is_empty() {
            return Err(Error::NoOpenBlock);
        }
        self.write_abbrev_id(END_BLOCK)?;
        self.writer.align(DWORD_BITS);

        // The stack is non-empty, checked above.
        if let Some(frame) = self.stack.pop() {
            let (start, length) = frame.finish();
            let dwords = (self.writer.offset() - start) / DWORD_BYTES;
            self.writer.resolve_dword(length, dwords as u32)?;
        }
        Ok(())
    }

    /// Define an abbreviation in the scope of the current block and return
    /// its wire id.
    pub fn define_abbr(&mut self, abbr: Abbr) -> Result<u64> {
        abbr.validate()?;
        match self.stack.last() {
            None => return Err(Error::DefineOutsideBlock),
            // Inside BLOCKINFO an abbreviation belongs to the SETBID target,
            // which only `write_block_info` tracks.
            Some(frame) if frame.block_id() == BLOCKINFO_BLOCK_ID => {
                return Err(Error::NoSetBid);
            }
            Some(_) => {}
        }

        self.write_abbrev_id(DEFINE_ABBREV)?;
        abbr.write_definition(&mut self.writer)?;

        // Still open: nothing above pops the stack.
        match self.stack.last_mut() {
            Some(frame) => frame.define(abbr),
            None => Err(Error::DefineOutsideBlock),
        }
    }

    /// Emit the BLOCKINFO block and remember its registry: blocks entered
    /// afterwards inherit the abbreviations registered for their block id,
    /// in registration order, before any locally defined ones.
    pub fn write_block_info(&mut self, info: BlockInfo) -> Result<()> {
        if self.info_written {
            return Err(Error::BlockInfoRewritten);
        }

        self.enter_block(BLOCKINFO_BLOCK_ID, ROOT_ABBREV_ID_WIDTH)?;
        for (block_id, abbrs) in &info {
            self.write_unabbrev_record(SETBID, &[*block_id])?;
            for (index, abbr) in abbrs.iter().enumerate() {
                abbr.validate()?;
                if abbrs[..index].iter().any(|a| a.name() == abbr.name()) {
                    return Err(Error::DuplicateAbbrev(abbr.name().to_owned()));
                }
                self.write_abbrev_id(DEFINE_ABBREV)?;
                abbr.write_definition(&mut self.writer)?;
            }
        }
        self.end_block()?;

        self.info = info;
        self.info_written = true;
        Ok(())
    }

    /// Whether the current block scope knows an abbreviation by this name.
    pub fn has_abbr(&self, name: &str) -> bool {
        self.stack.last().is_some_and(|frame| frame.has(name))
    }

    /// Write a record through a previously registered abbreviation.
    pub fn write_record(&mut self, name: &str, values: &[RecordValue]) -> Result<()> {
        let frame = self.stack.last().ok_or(Error::RecordOutsideBlock)?;
        let (id, abbr) = frame
            .get(name)
            .ok_or_else(|| Error::UnknownAbbrev(name.to_owned()))?;

        let width = frame.abbrev_id_width();
        if id >= 1 << width {
            return Err(Error::AbbrevIdOverflow(id, width));
        }
        self.writer.write_bits(id as u32, width)?;
        abbr.write_value(&mut self.writer, values)
    }

    /// Write a record with no abbreviation: `UNABBREV_RECORD`, then the
    /// code, the operand count, and every operand, all VBR6.
    pub fn write_unabbrev_record(&mut self, code: u64, ops: &[u64]) -> Result<()> {
        if self.stack.is_empty() {
            return Err(Error::RecordOutsideBlock);
        }
        self.write_abbrev_id(UNABBREV_RECORD)?;
        self.writer.write_vbr(code, UNABBREV_OP_WIDTH)?;
        self.writer.write_vbr(ops.len() as u64, UNABBREV_OP_WIDTH)?;
        for op in ops {
            self.writer.write_vbr(*op, UNABBREV_OP_WIDTH)?;
        }
        Ok(())
    }

    /// Raw VBR field, outside of any record structure.
    #[inline]
    pub fn write_vbr(&mut self, value: u64, width: u32) -> Result<()> {
        self.writer.write_vbr(value, width)
    }

    /// Raw bit field, outside of any record structure.
    #[inline]
    pub fn write_bits(&mut self, value: u32, width: u32) -> Result<()> {
        self.writer.write_bits(value, width)
    }

    #[inline]
    pub fn align(&mut self, bits: u32) {
        self.writer.align(bits);
    }

    /// Finalize the stream. All blocks must be closed.
    pub fn end(self) -> Result<Vec<u8>> {
        if !self.stack.is_empty() {
            return Err(Error::OpenBlocks(self.stack.len()));
        }
        self.writer.end()
    }

    /// Abbreviation id in the width of the innermost block (2 bits at the
    /// stream root).
    fn write_abbrev_id(&mut self, id: u64) -> Result<()> {
        let width = self
            .stack
            .last()
            .map_or(ROOT_ABBREV_ID_WIDTH, Frame::abbrev_id_width);
        if id >= 1 << width {
            return Err(Error::AbbrevIdOverflow(id, width));
        }
        self.writer.write_bits(id as u32, width)
    }
}

impl Default for BitStream {
    fn default() -> Self {
        Self::new()
    }
}
