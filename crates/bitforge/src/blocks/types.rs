//! The type table block.
//!
//! Types are collected up front so records elsewhere can reference them by
//! index, then emitted in an order where composite types follow their
//! components (pointer cycles through named structs excepted).

use bitforge_ir::{Type, TypeId, TypeStore};
use bitforge_stream::{Abbr, BitStream, Operand, RecordValue};
use indexmap::IndexSet;
use std::collections::HashSet;

use crate::codes::{block_id, type_code, vbr};
use crate::error::{Error, Result};

const ABBREV_ID_WIDTH: u32 = 4;

/// Address space operand of pointer records; only the default space is
/// representable.
const ADDRESS_SPACE: u64 = 0;

#[derive(Debug, Default)]
pub struct TypeBlock {
    order: IndexSet<TypeId>,
    visiting: HashSet<TypeId>,
}

impl TypeBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `ty` and, first, every type it is built from.
    pub fn add(&mut self, types: &TypeStore, ty: TypeId) {
        if self.order.contains(&ty) || !self.visiting.insert(ty) {
            return;
        }
        match types.get(ty) {
            Type::Pointer { pointee } => self.add(types, *pointee),
            Type::Array { elem, .. } => self.add(types, *elem),
            Type::Signature { ret, params } => {
                self.add(types, *ret);
                for &param in params {
                    self.add(types, param);
                }
            }
            Type::Struct { fields, .. } => {
                for &field in fields {
                    self.add(types, field);
                }
            }
            Type::Void | Type::Label | Type::Metadata | Type::Int { .. } => {}
        }
        self.visiting.remove(&ty);
        self.order.insert(ty);
    }

    /// Wire index of a collected type.
    pub fn index_of(&self, ty: TypeId) -> Result<u64> {
        self.order
            .get_index_of(&ty)
            .map(|i| i as u64)
            .ok_or(Error::UnknownType)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Emit the TYPE block. Abbreviations are defined lazily, on the first
    /// record that needs them.
    pub fn build(&self, stream: &mut BitStream, types: &TypeStore) -> Result<()> {
        stream.enter_block(block_id::TYPE, ABBREV_ID_WIDTH)?;
        stream.write_unabbrev_record(type_code::NUMENTRY, &[self.order.len() as u64])?;

        for &ty in &self.order {
            match types.get(ty) {
                Type::Void => stream.write_unabbrev_record(type_code::VOID, &[])?,
                Type::Label => stream.write_unabbrev_record(type_code::LABEL, &[])?,
                Type::Metadata => stream.write_unabbrev_record(type_code::METADATA, &[])?,
                Type::Int { bits } => {
                    if !stream.has_abbr("int") {
                        stream.define_abbr(Abbr::new(
                            "int",
                            vec![
                                Operand::Literal(type_code::INTEGER),
                                Operand::Vbr(vbr::INT_WIDTH),
                            ],
                        ))?;
                    }
                    stream.write_record("int", &[u64::from(*bits).into()])?;
                }
                Type::Pointer { pointee } => {
                    if !stream.has_abbr("ptr") {
                        stream.define_abbr(Abbr::new(
                            "ptr",
                            vec![
                                Operand::Literal(type_code::POINTER),
                                Operand::Vbr(vbr::TYPE_INDEX),
                                Operand::Literal(ADDRESS_SPACE),
                            ],
                        ))?;
                    }
                    stream.write_record("ptr", &[self.index_of(*pointee)?.into()])?;
                }
                Type::Array { len, elem } => {
                    if !stream.has_abbr("array") {
                        stream.define_abbr(Abbr::new(
                            "array",
                            vec![
                                Operand::Literal(type_code::ARRAY),
                                Operand::Vbr(vbr::ARRAY_LENGTH),
                                Operand::Vbr(vbr::TYPE_INDEX),
                            ],
                        ))?;
                    }
                    stream
                        .write_record("array", &[(*len).into(), self.index_of(*elem)?.into()])?;
                }
                Type::Signature { ret, params } => {
                    // [vararg, return type, param types...]; varargs are
                    // not representable, the flag is always clear.
                    let mut ops = Vec::with_capacity(params.len() + 2);
                    ops.push(0);
                    ops.push(self.index_of(*ret)?);
                    for &param in params {
                        ops.push(self.index_of(param)?);
                    }
                    stream.write_unabbrev_record(type_code::FUNCTION, &ops)?;
                }
                Type::Struct {
                    name: None, fields, ..
                } => {
                    let ops = self.struct_body(fields)?;
                    stream.write_unabbrev_record(type_code::STRUCT_ANON, &ops)?;
                }
                Type::Struct {
                    name: Some(name),
                    fields,
                    opaque,
                } => {
                    if !stream.has_abbr("struct_name") {
                        stream.define_abbr(Abbr::new(
                            "struct_name",
                            vec![
                                Operand::Literal(type_code::STRUCT_NAME),
                                Operand::Array(Box::new(Operand::Char6)),
                            ],
                        ))?;
                    }
                    stream.write_record("struct_name", &[RecordValue::chars(name)])?;
                    if *opaque {
                        stream.write_unabbrev_record(type_code::OPAQUE, &[0])?;
                    } else {
                        let ops = self.struct_body(fields)?;
                        stream.write_unabbrev_record(type_code::STRUCT_NAMED, &ops)?;
                    }
                }
            }
        }
        stream.end_block()?;
        Ok(())
    }

    /// `[packed, field types...]`; packed structs are not representable.
    fn struct_body(&self, fields: &[TypeId]) -> Result<Vec<u64>> {
        let mut ops = Vec::with_capacity(fields.len() + 1);
        ops.push(0);
        for &field in fields {
            ops.push(self.index_of(field)?);
        }
        Ok(ops)
    }
}
