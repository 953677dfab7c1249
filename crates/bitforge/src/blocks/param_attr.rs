//! Attribute group and attribute entry blocks.
//!
//! Attributes are deduplicated into groups keyed by (position, contents);
//! every attributed symbol then gets an entry record listing its group
//! ids. Records reference entries by 1-based index, 0 meaning "none".

use bitforge_ir::{AttrValue, Attribute, ValueRef};
use bitforge_stream::BitStream;
use indexmap::IndexMap;
use std::collections::HashMap;

use crate::codes::{block_id, known_attribute, paramattr_code, paramattr_group_code};
use crate::error::{Error, Result};

const ABBREV_ID_WIDTH: u32 = 2;

/// Position operand of a group targeting the return value.
const RETURN_INDEX: u64 = 0;
/// Position operand of a group targeting the function (or global) itself.
const FUNCTION_INDEX: u64 = 0xffff_ffff;

const KIND_WELL_KNOWN: u64 = 0;
const KIND_WELL_KNOWN_WITH_VALUE: u64 = 1;
const KIND_STRING: u64 = 3;
const KIND_STRING_WITH_VALUE: u64 = 4;

#[derive(Debug, Default)]
pub struct ParamAttrBlock {
    /// Group fingerprint to its 1-based group id.
    cache: IndexMap<String, u64>,
    /// Group entry records, ready to write.
    groups: Vec<Vec<u64>>,
    /// PARAMATTR entry records: lists of group ids.
    entries: Vec<Vec<u64>>,
    index: HashMap<ValueRef, u64>,
}

impl ParamAttrBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the attributes of a function or declaration.
    pub fn add_function(
        &mut self,
        v: ValueRef,
        fn_attrs: &[Attribute],
        return_attrs: &[Attribute],
        param_attrs: &[Vec<Attribute>],
    ) -> Result<()> {
        let mut groups = Vec::new();
        if !return_attrs.is_empty() {
            groups.push(self.group(RETURN_INDEX, return_attrs)?);
        }
        for (i, attrs) in param_attrs.iter().enumerate() {
            if !attrs.is_empty() {
                groups.push(self.group(1 + i as u64, attrs)?);
            }
        }
        if !fn_attrs.is_empty() {
            groups.push(self.group(FUNCTION_INDEX, fn_attrs)?);
        }
        self.entry(v, groups);
        Ok(())
    }

    /// Register the attributes of a global variable.
    pub fn add_global(&mut self, v: ValueRef, attrs: &[Attribute]) -> Result<()> {
        if attrs.is_empty() {
            return Ok(());
        }
        let group = self.group(FUNCTION_INDEX, attrs)?;
        self.entry(v, vec![group]);
        Ok(())
    }

    /// 1-based entry index for a registered symbol, `0` when it carries no
    /// attributes.
    pub fn entry_index(&self, v: ValueRef) -> u64 {
        self.index.get(&v).copied().unwrap_or(0)
    }

    /// Emit the PARAMATTR_GROUP and PARAMATTR blocks. No attributes, no
    /// blocks.
    pub fn build(&self, stream: &mut BitStream) -> Result<()> {
        if self.groups.is_empty() {
            return Ok(());
        }
        stream.enter_block(block_id::PARAMATTR_GROUP, ABBREV_ID_WIDTH)?;
        for record in &self.groups {
            stream.write_unabbrev_record(paramattr_group_code::ENTRY, record)?;
        }
        stream.end_block()?;

        stream.enter_block(block_id::PARAMATTR, ABBREV_ID_WIDTH)?;
        for entry in &self.entries {
            stream.write_unabbrev_record(paramattr_code::ENTRY, entry)?;
        }
        stream.end_block()?;
        Ok(())
    }

    // Private

    fn entry(&mut self, v: ValueRef, groups: Vec<u64>) {
        if groups.is_empty() {
            return;
        }
        self.entries.push(groups);
        self.index.insert(v, self.entries.len() as u64);
    }

    fn group(&mut self, param_index: u64, attrs: &[Attribute]) -> Result<u64> {
        let ops = Self::group_ops(attrs)?;
        let fingerprint = format!("{param_index}:{ops:?}");
        if let Some(&id) = self.cache.get(&fingerprint) {
            return Ok(id);
        }

        let id = self.groups.len() as u64 + 1;
        let mut record = Vec::with_capacity(ops.len() + 2);
        record.push(id);
        record.push(param_index);
        record.extend(ops);
        self.groups.push(record);
        self.cache.insert(fingerprint, id);
        Ok(id)
    }

    /// Attribute operands in canonical order: well-known keys by wire id,
    /// then custom string keys lexically.
    fn group_ops(attrs: &[Attribute]) -> Result<Vec<u64>> {
        let mut known: Vec<(u64, &Attribute)> = Vec::new();
        let mut custom: Vec<&Attribute> = Vec::new();
        for attr in attrs {
            match known_attribute(&attr.key) {
                Some(id) => known.push((id, attr)),
                None => custom.push(attr),
            }
        }
        known.sort_by_key(|(id, _)| *id);
        custom.sort_by(|a, b| a.key.cmp(&b.key));

        let mut ops = Vec::new();
        for (id, attr) in known {
            match &attr.value {
                None => {
                    ops.push(KIND_WELL_KNOWN);
                    ops.push(id);
                }
                Some(AttrValue::Int(value)) => {
                    ops.push(KIND_WELL_KNOWN_WITH_VALUE);
                    ops.push(id);
                    ops.push(*value);
                }
                Some(AttrValue::Str(_)) => {
                    return Err(Error::AttributeValue(attr.key.clone()));
                }
            }
        }
        for attr in custom {
            match &attr.value {
                None => {
                    ops.push(KIND_STRING);
                    Self::push_str(&mut ops, &attr.key);
                }
                Some(value) => {
                    ops.push(KIND_STRING_WITH_VALUE);
                    Self::push_str(&mut ops, &attr.key);
                    match value {
                        AttrValue::Str(s) => Self::push_str(&mut ops, s),
                        AttrValue::Int(v) => Self::push_str(&mut ops, &v.to_string()),
                    }
                }
            }
        }
        Ok(ops)
    }

    /// NUL-terminated byte operands, as string attributes travel.
    fn push_str(ops: &mut Vec<u64>, s: &str) {
        ops.extend(s.bytes().map(u64::from));
        ops.push(0);
    }
}
