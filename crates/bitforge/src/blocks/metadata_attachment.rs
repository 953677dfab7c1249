//! Instruction-to-metadata attachment records, one block per function.

use bitforge_ir::{Function, Module, Value};
use bitforge_stream::BitStream;
use indexmap::IndexMap;

use crate::blocks::MetadataBlock;
use crate::codes::{block_id, metadata_attachment_code};
use crate::error::{Error, Result};

const ABBREV_ID_WIDTH: u32 = 3;

/// Emit the attachment block for one function. Instructions are addressed
/// by position, counted across all basic blocks; each record is the
/// position followed by (kind id, metadata index) pairs.
pub fn build(
    stream: &mut BitStream,
    module: &Module,
    func: &Function,
    metadata: &MetadataBlock,
    kinds: &IndexMap<String, u64>,
) -> Result<()> {
    let mut records: Vec<Vec<u64>> = Vec::new();
    let mut position = 0u64;
    for bb in &func.blocks {
        for &i in &bb.instrs {
            if let Value::Instruction(instr) = module.value(i)
                && !instr.metadata.is_empty()
            {
                let mut ops = Vec::with_capacity(1 + 2 * instr.metadata.len());
                ops.push(position);
                for (kind, node) in &instr.metadata {
                    let id = kinds
                        .get(kind)
                        .copied()
                        .ok_or_else(|| Error::UnknownMetadataKind(kind.clone()))?;
                    ops.push(id);
                    ops.push(metadata.get(*node)?);
                }
                records.push(ops);
            }
            position += 1;
        }
    }

    if records.is_empty() {
        return Ok(());
    }
    stream.enter_block(block_id::METADATA_ATTACHMENT, ABBREV_ID_WIDTH)?;
    for record in &records {
        stream.write_unabbrev_record(metadata_attachment_code::ATTACHMENT, record)?;
    }
    stream.end_block()?;
    Ok(())
}
