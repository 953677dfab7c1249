//! Metadata blocks.
//!
//! Metadata lives in its own index space, separate from value ids. Strings
//! come first (they are batched into one STRINGS record), then wrapped
//! values, then tuples; a node's final index is fixed at construction so
//! tuple operands can point anywhere in the block.

use bitforge_ir::{Metadata, Module, Value, ValueRef};
use bitforge_stream::{Abbr, BitStream, BitWriter, BlockInfo, Operand, RecordValue};
use indexmap::IndexMap;
use std::collections::HashMap;

use crate::blocks::TypeBlock;
use crate::codes::{block_id, metadata_code, vbr};
use crate::enumerator::Enumerator;
use crate::error::{Error, Result};

const ABBREV_ID_WIDTH: u32 = 3;
const STRING_LEN_WIDTH: u32 = 6;

#[derive(Debug)]
pub struct MetadataBlock {
    /// Unique string contents to their string index. Two nodes with equal
    /// text share one slot.
    strings: IndexMap<String, u64>,
    values: Vec<ValueRef>,
    tuples: Vec<ValueRef>,
    index: HashMap<ValueRef, u64>,
}

impl MetadataBlock {
    pub fn register_info(info: &mut BlockInfo) {
        info.insert(
            block_id::METADATA,
            vec![
                Abbr::new(
                    "strings",
                    vec![
                        Operand::Literal(metadata_code::STRINGS),
                        Operand::Vbr(vbr::METADATA_STRING_COUNT),
                        Operand::Vbr(vbr::METADATA_STRING_OFF),
                        Operand::Blob,
                    ],
                ),
                Abbr::new(
                    "value",
                    vec![
                        Operand::Literal(metadata_code::VALUE),
                        Operand::Vbr(vbr::TYPE_INDEX),
                        Operand::Vbr(vbr::VALUE_INDEX),
                    ],
                ),
                Abbr::new(
                    "tuple",
                    vec![
                        Operand::Literal(metadata_code::NODE),
                        Operand::Array(Box::new(Operand::Vbr(vbr::METADATA_INDEX))),
                    ],
                ),
            ],
        );
    }

    /// Classify `list` (an enumerator's per-function node list) and pin
    /// down every node's final index.
    pub fn new(module: &Module, list: &[ValueRef]) -> Self {
        let mut strings: IndexMap<String, u64> = IndexMap::new();
        let mut values = Vec::new();
        let mut tuples = Vec::new();
        let mut string_nodes = Vec::new();

        for &node in list {
            match module.value(node) {
                Value::Metadata(Metadata::String(s)) => {
                    let next = strings.len() as u64;
                    let idx = *strings.entry(s.clone()).or_insert(next);
                    string_nodes.push((node, idx));
                }
                Value::Metadata(Metadata::Value { .. }) => values.push(node),
                Value::Metadata(Metadata::Tuple(_)) => tuples.push(node),
                _ => {}
            }
        }

        let mut index = HashMap::new();
        for (node, idx) in string_nodes {
            index.insert(node, idx);
        }
        let base = strings.len() as u64;
        for (i, &node) in values.iter().enumerate() {
            index.insert(node, base + i as u64);
        }
        let tuple_base = base + values.len() as u64;
        for (i, &node) in tuples.iter().enumerate() {
            index.insert(node, tuple_base + i as u64);
        }

        Self {
            strings,
            values,
            tuples,
            index,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Final metadata index of a node.
    pub fn get(&self, node: ValueRef) -> Result<u64> {
        self.index.get(&node).copied().ok_or(Error::NotEnumerated)
    }

    /// Emit the METADATA block. An empty block is skipped entirely.
    pub fn build(
        &self,
        stream: &mut BitStream,
        enumerator: &Enumerator,
        types: &TypeBlock,
        module: &Module,
    ) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        stream.enter_block(block_id::METADATA, ABBREV_ID_WIDTH)?;

        if !self.strings.is_empty() {
            // One record for every string: the blob is a bit-packed run of
            // VBR6 lengths followed by the concatenated bytes, and the
            // second operand says where the bytes start.
            let mut lengths = BitWriter::new();
            for s in self.strings.keys() {
                lengths.write_vbr(s.len() as u64, STRING_LEN_WIDTH)?;
            }
            let mut blob = lengths.end()?;
            let offset = blob.len() as u64;
            for s in self.strings.keys() {
                blob.extend_from_slice(s.as_bytes());
            }
            stream.write_record(
                "strings",
                &[
                    (self.strings.len() as u64).into(),
                    offset.into(),
                    RecordValue::blob(blob),
                ],
            )?;
        }

        for &node in &self.values {
            if let Value::Metadata(Metadata::Value { ty, value }) = module.value(node) {
                // A function symbol as metadata is referenced through a
                // pointer to its signature.
                let ty = if module.types().is_signature(*ty) {
                    module.types().lookup_ptr(*ty).ok_or(Error::UnknownType)?
                } else {
                    *ty
                };
                stream.write_record(
                    "value",
                    &[types.index_of(ty)?.into(), enumerator.get(*value)?.into()],
                )?;
            }
        }

        for &node in &self.tuples {
            if let Value::Metadata(Metadata::Tuple(ops)) = module.value(node) {
                // Tuple operands are 1-based; 0 is the null node.
                let ids = ops
                    .iter()
                    .map(|&op| self.get(op).map(|i| i + 1))
                    .collect::<Result<Vec<_>>>()?;
                stream.write_record("tuple", &[ids.into()])?;
            }
        }

        stream.end_block()?;
        Ok(())
    }
}
