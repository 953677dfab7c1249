//! Function body blocks.
//!
//! A body block carries, in order: the function's private constants and
//! metadata, the block count, every instruction, the value symbol table,
//! and the metadata attachments. Instruction operands reference values by
//! distance: the emitting instruction's id minus the operand's id.

use bitforge_ir::{InstrKind, Instruction, Module, Value, ValueRef};
use bitforge_stream::{Abbr, BitStream, BlockInfo, Operand, RecordValue};

use crate::blocks::{ConstantBlock, MetadataBlock, TypeBlock, metadata_attachment};
use crate::codes::{block_id, fixed, function_code, value_symtab_code, vbr};
use crate::encoding;
use crate::enumerator::Enumerator;
use crate::error::{Error, Result};

const ABBREV_ID_WIDTH: u32 = 6;
const SYMTAB_ABBREV_ID_WIDTH: u32 = 3;

/// Attribute-entry operand of call records; call-site attributes are not
/// representable.
const CALL_ATTR_NONE: u64 = 0;

pub struct FunctionBlock;

impl FunctionBlock {
    pub fn register_info(info: &mut BlockInfo) {
        use Operand::{Array, Fixed, Literal, Vbr};
        info.insert(
            block_id::FUNCTION,
            vec![
                Abbr::new(
                    "declareblocks",
                    vec![
                        Literal(function_code::DECLAREBLOCKS),
                        Vbr(vbr::BLOCK_COUNT),
                    ],
                ),
                Abbr::new("ret_void", vec![Literal(function_code::INST_RET)]),
                Abbr::new(
                    "ret",
                    vec![Literal(function_code::INST_RET), Vbr(vbr::VALUE_INDEX)],
                ),
                Abbr::new(
                    "jump",
                    vec![Literal(function_code::INST_BR), Vbr(vbr::BLOCK_INDEX)],
                ),
                Abbr::new(
                    "branch",
                    vec![
                        Literal(function_code::INST_BR),
                        Vbr(vbr::BLOCK_INDEX),
                        Vbr(vbr::BLOCK_INDEX),
                        Vbr(vbr::VALUE_INDEX),
                    ],
                ),
                Abbr::new(
                    "unreachable",
                    vec![Literal(function_code::INST_UNREACHABLE)],
                ),
                Abbr::new(
                    "cast",
                    vec![
                        Literal(function_code::INST_CAST),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::TYPE_INDEX),
                        Fixed(fixed::CAST_TYPE),
                    ],
                ),
                Abbr::new(
                    "binop",
                    vec![
                        Literal(function_code::INST_BINOP),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::VALUE_INDEX),
                        Fixed(fixed::BINOP_TYPE),
                    ],
                ),
                Abbr::new(
                    "icmp",
                    vec![
                        Literal(function_code::INST_CMP),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::VALUE_INDEX),
                        Fixed(fixed::PREDICATE),
                    ],
                ),
                Abbr::new(
                    "load",
                    vec![
                        Literal(function_code::INST_LOAD),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::TYPE_INDEX),
                        Vbr(vbr::ALIGNMENT),
                        Fixed(fixed::BOOL),
                    ],
                ),
                Abbr::new(
                    "store",
                    vec![
                        Literal(function_code::INST_STORE),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::ALIGNMENT),
                        Fixed(fixed::BOOL),
                    ],
                ),
                Abbr::new(
                    "gep",
                    vec![
                        Literal(function_code::INST_GEP),
                        Fixed(fixed::BOOL),
                        Vbr(vbr::TYPE_INDEX),
                        Array(Box::new(Vbr(vbr::VALUE_INDEX))),
                    ],
                ),
                Abbr::new(
                    "extractval",
                    vec![
                        Literal(function_code::INST_EXTRACTVAL),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::VALUE_INDEX),
                    ],
                ),
                Abbr::new(
                    "insertval",
                    vec![
                        Literal(function_code::INST_INSERTVAL),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::VALUE_INDEX),
                        Vbr(vbr::VALUE_INDEX),
                    ],
                ),
            ],
        );
        info.insert(
            block_id::VALUE_SYMTAB,
            vec![
                Abbr::new(
                    "entry",
                    vec![
                        Literal(value_symtab_code::ENTRY),
                        Vbr(vbr::VALUE_INDEX),
                        Array(Box::new(Operand::Char6)),
                    ],
                ),
                Abbr::new(
                    "bbentry",
                    vec![
                        Literal(value_symtab_code::BBENTRY),
                        Vbr(vbr::BLOCK_INDEX),
                        Array(Box::new(Operand::Char6)),
                    ],
                ),
            ],
        );
    }

    /// Emit the body block of one function definition.
    pub fn build(
        stream: &mut BitStream,
        enumerator: &mut Enumerator,
        types: &TypeBlock,
        module: &Module,
        func_ref: ValueRef,
    ) -> Result<()> {
        let func = module.function(func_ref)?;
        stream.enter_block(block_id::FUNCTION, ABBREV_ID_WIDTH)?;

        let fn_constants = enumerator.function_constants(func_ref).to_vec();
        ConstantBlock::build(stream, enumerator, types, module, &fn_constants)?;

        let metadata = MetadataBlock::new(module, enumerator.function_metadata(func_ref));
        metadata.build(stream, enumerator, types, module)?;

        stream.write_record("declareblocks", &[(func.blocks.len() as u64).into()])?;

        for bb in &func.blocks {
            for &i in &bb.instrs {
                let Value::Instruction(instr) = module.value(i) else {
                    continue;
                };
                Self::instruction(stream, enumerator, types, module, i, instr)?;
            }
        }

        Self::symtab(stream, enumerator, module, func_ref)?;
        metadata_attachment::build(stream, module, func, &metadata, enumerator.metadata_kinds())?;

        stream.end_block()?;
        enumerator.leave_function()?;
        Ok(())
    }

    fn instruction(
        stream: &mut BitStream,
        enumerator: &mut Enumerator,
        types: &TypeBlock,
        module: &Module,
        instr_ref: ValueRef,
        instr: &Instruction,
    ) -> Result<()> {
        let id = enumerator.check_value_order(instr_ref)?;
        let enumerator = &*enumerator;
        let rel = |op: ValueRef| -> Result<u64> {
            let op_id = enumerator.get(op)?;
            id.checked_sub(op_id).ok_or(Error::ForwardReference)
        };

        match &instr.kind {
            InstrKind::Ret { value: None } => stream.write_record("ret_void", &[])?,
            InstrKind::Ret { value: Some(v) } => {
                stream.write_record("ret", &[rel(*v)?.into()])?;
            }
            InstrKind::Jump { target } => {
                stream.write_record("jump", &[(target.index() as u64).into()])?;
            }
            InstrKind::Branch {
                on_true,
                on_false,
                cond,
            } => stream.write_record(
                "branch",
                &[
                    (on_true.index() as u64).into(),
                    (on_false.index() as u64).into(),
                    rel(*cond)?.into(),
                ],
            )?,
            InstrKind::Switch {
                cond,
                default,
                cases,
            } => {
                let mut ops = vec![
                    types.index_of(module.value_type(*cond))?,
                    rel(*cond)?,
                    default.index() as u64,
                ];
                for (value, target) in cases {
                    // Case values are absolute ids: the record is already
                    // irregular and readers expect them that way.
                    ops.push(enumerator.get(*value)?);
                    ops.push(target.index() as u64);
                }
                stream.write_unabbrev_record(function_code::INST_SWITCH, &ops)?;
            }
            InstrKind::Unreachable => stream.write_record("unreachable", &[])?,
            InstrKind::Phi { edges } => {
                // Incoming values may be defined later, so the distance is
                // sign-encoded.
                let mut ops = vec![types.index_of(instr.ty)?];
                for (value, block) in edges {
                    let op_id = enumerator.get(*value)?;
                    ops.push(encoding::signed(id as i64 - op_id as i64));
                    ops.push(block.index() as u64);
                }
                stream.write_unabbrev_record(function_code::INST_PHI, &ops)?;
            }
            InstrKind::Cast { value, to, op } => stream.write_record(
                "cast",
                &[
                    rel(*value)?.into(),
                    types.index_of(*to)?.into(),
                    encoding::cast_op(*op).into(),
                ],
            )?,
            InstrKind::Binop { op, lhs, rhs } => stream.write_record(
                "binop",
                &[
                    rel(*lhs)?.into(),
                    rel(*rhs)?.into(),
                    encoding::binop(*op).into(),
                ],
            )?,
            InstrKind::Icmp { pred, lhs, rhs } => stream.write_record(
                "icmp",
                &[
                    rel(*lhs)?.into(),
                    rel(*rhs)?.into(),
                    encoding::icmp_pred(*pred).into(),
                ],
            )?,
            InstrKind::Load {
                ptr,
                align,
                volatile,
            } => stream.write_record(
                "load",
                &[
                    rel(*ptr)?.into(),
                    types.index_of(instr.ty)?.into(),
                    encoding::alignment(*align)?.into(),
                    u64::from(*volatile).into(),
                ],
            )?,
            InstrKind::Store {
                ptr,
                value,
                align,
                volatile,
            } => stream.write_record(
                "store",
                &[
                    rel(*ptr)?.into(),
                    rel(*value)?.into(),
                    encoding::alignment(*align)?.into(),
                    u64::from(*volatile).into(),
                ],
            )?,
            InstrKind::Gep {
                inbounds,
                elem_ty,
                operands,
            } => {
                let ids = operands.iter().map(|&op| rel(op)).collect::<Result<Vec<_>>>()?;
                stream.write_record(
                    "gep",
                    &[
                        u64::from(*inbounds).into(),
                        types.index_of(*elem_ty)?.into(),
                        ids.into(),
                    ],
                )?;
            }
            InstrKind::ExtractValue { aggr, index } => stream.write_record(
                "extractval",
                &[rel(*aggr)?.into(), (*index).into()],
            )?,
            InstrKind::InsertValue { aggr, elem, index } => stream.write_record(
                "insertval",
                &[rel(*aggr)?.into(), rel(*elem)?.into(), (*index).into()],
            )?,
            InstrKind::Call {
                callee,
                sig,
                args,
                cconv,
                tail,
            } => {
                let mut ops = vec![
                    CALL_ATTR_NONE,
                    encoding::call_flags(*cconv, *tail),
                    types.index_of(*sig)?,
                    rel(*callee)?,
                ];
                for &arg in args {
                    ops.push(rel(arg)?);
                }
                stream.write_unabbrev_record(function_code::INST_CALL, &ops)?;
            }
        }
        Ok(())
    }

    /// Names for basic blocks and arguments. The block is emitted even
    /// when everything is anonymous; readers tolerate an empty table.
    fn symtab(
        stream: &mut BitStream,
        enumerator: &Enumerator,
        module: &Module,
        func_ref: ValueRef,
    ) -> Result<()> {
        let func = module.function(func_ref)?;
        stream.enter_block(block_id::VALUE_SYMTAB, SYMTAB_ABBREV_ID_WIDTH)?;
        for (i, bb) in func.blocks.iter().enumerate() {
            if let Some(name) = &bb.name {
                stream.write_record(
                    "bbentry",
                    &[(i as u64).into(), RecordValue::chars(name)],
                )?;
            }
        }
        for &arg in &func.args {
            if let Value::Argument(a) = module.value(arg)
                && let Some(name) = &a.name
            {
                stream.write_record(
                    "entry",
                    &[enumerator.get(arg)?.into(), RecordValue::chars(name)],
                )?;
            }
        }
        stream.end_block()?;
        Ok(())
    }
}
