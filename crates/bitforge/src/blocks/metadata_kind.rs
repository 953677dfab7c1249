//! The metadata-kind block: names the kind ids used by attachment
//! records.

use bitforge_stream::{Abbr, BitStream, Operand, RecordValue};
use indexmap::IndexMap;

use crate::codes::{block_id, fixed, metadata_kind_code, vbr};
use crate::error::Result;

const ABBREV_ID_WIDTH: u32 = 3;

pub struct MetadataKindBlock;

impl MetadataKindBlock {
    /// Emit one KIND record per interned kind. No kinds, no block.
    pub fn build(stream: &mut BitStream, kinds: &IndexMap<String, u64>) -> Result<()> {
        if kinds.is_empty() {
            return Ok(());
        }
        stream.enter_block(block_id::METADATA_KIND, ABBREV_ID_WIDTH)?;
        stream.define_abbr(Abbr::new(
            "kind",
            vec![
                Operand::Literal(metadata_kind_code::KIND),
                Operand::Vbr(vbr::METADATA_KIND_INDEX),
                Operand::Array(Box::new(Operand::Fixed(fixed::CHAR))),
            ],
        ))?;
        for (name, id) in kinds {
            stream.write_record("kind", &[(*id).into(), RecordValue::chars(name)])?;
        }
        stream.end_block()?;
        Ok(())
    }
}
