//! Constants blocks, both module-level and per-function.
//!
//! Records are grouped under SETTYPE: the current type is switched only
//! when a constant of a different type comes up. The abbreviations live in
//! BLOCKINFO because two kinds of block share them.

use bitforge_ir::{Constant, Module, Value, ValueRef};
use bitforge_stream::{Abbr, BitStream, BlockInfo, Operand};

use crate::blocks::TypeBlock;
use crate::codes::{block_id, constants_code, vbr};
use crate::encoding;
use crate::enumerator::Enumerator;
use crate::error::Result;

const ABBREV_ID_WIDTH: u32 = 5;

pub struct ConstantBlock;

impl ConstantBlock {
    pub fn register_info(info: &mut BlockInfo) {
        info.insert(
            block_id::CONSTANTS,
            vec![
                Abbr::new(
                    "settype",
                    vec![
                        Operand::Literal(constants_code::SETTYPE),
                        Operand::Vbr(vbr::TYPE_INDEX),
                    ],
                ),
                Abbr::new(
                    "int",
                    vec![
                        Operand::Literal(constants_code::INTEGER),
                        Operand::Vbr(vbr::INTEGER),
                    ],
                ),
                Abbr::new("null", vec![Operand::Literal(constants_code::NULL)]),
                Abbr::new("undef", vec![Operand::Literal(constants_code::UNDEF)]),
                Abbr::new(
                    "aggr",
                    vec![
                        Operand::Literal(constants_code::AGGREGATE),
                        Operand::Array(Box::new(Operand::Vbr(vbr::VALUE_INDEX))),
                    ],
                ),
            ],
        );
    }

    /// Emit one constants block for `list`. An empty list emits nothing.
    pub fn build(
        stream: &mut BitStream,
        enumerator: &mut Enumerator,
        types: &TypeBlock,
        module: &Module,
        list: &[ValueRef],
    ) -> Result<()> {
        if list.is_empty() {
            return Ok(());
        }
        stream.enter_block(block_id::CONSTANTS, ABBREV_ID_WIDTH)?;

        let mut current_ty = None;
        for &c in list {
            enumerator.check_value_order(c)?;
            let Value::Constant(constant) = module.value(c) else {
                return Err(bitforge_ir::Error::NotAConstant.into());
            };

            let ty = constant.ty();
            if current_ty != Some(ty) {
                stream.write_record("settype", &[types.index_of(ty)?.into()])?;
                current_ty = Some(ty);
            }

            match constant {
                Constant::Int { value, .. } => {
                    stream.write_record("int", &[encoding::signed(*value).into()])?;
                }
                Constant::Null { .. } => stream.write_record("null", &[])?,
                Constant::Undef { .. } => stream.write_record("undef", &[])?,
                Constant::Aggregate { elems, .. } => {
                    let ids = elems
                        .iter()
                        .map(|&e| enumerator.get(e))
                        .collect::<Result<Vec<_>>>()?;
                    stream.write_record("aggr", &[ids.into()])?;
                }
            }
        }
        stream.end_block()?;
        Ok(())
    }
}
