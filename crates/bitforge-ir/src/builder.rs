//! Body builder for function definitions.

use crate::error::{Error, Result};
use crate::module::{BasicBlock, Module};
use crate::types::{Type, TypeId};
use crate::values::{
    BinOp, BlockId, CallConv, CastOp, IcmpPred, InstrKind, Instruction, TailKind, Value, ValueRef,
};

/// Appends basic blocks and instructions to one function definition.
///
/// Instructions go to the most recently created (or [`switch_to`]'d)
/// block. Every append returns the instruction's `ValueRef` so later
/// instructions can reference it.
///
/// [`switch_to`]: FunctionBuilder::switch_to
#[derive(Debug)]
pub struct FunctionBuilder<'m> {
    module: &'m mut Module,
    func: ValueRef,
    current: Option<BlockId>,
}

impl<'m> FunctionBuilder<'m> {
    pub(crate) fn new(module: &'m mut Module, func: ValueRef) -> Self {
        Self {
            module,
            func,
            current: None,
        }
    }

    #[inline]
    pub fn module(&mut self) -> &mut Module {
        self.module
    }

    pub fn arg(&self, index: usize) -> ValueRef {
        match self.module.value(self.func) {
            Value::Function(f) => f.args[index],
            _ => unreachable!("builder always points at a function"),
        }
    }

    pub fn name_arg(&mut self, index: usize, name: impl Into<String>) {
        let arg = self.arg(index);
        if let Value::Argument(a) = &mut self.module_values_mut()[arg.index()] {
            a.name = Some(name.into());
        }
    }

    /// Create a basic block and make it current.
    pub fn block(&mut self, name: Option<&str>) -> BlockId {
        // The builder's function ref is always valid.
        let blocks = match self.module.function_mut(self.func) {
            Ok(f) => &mut f.blocks,
            Err(_) => unreachable!("builder always points at a function"),
        };
        let id = BlockId(blocks.len() as u32);
        blocks.push(BasicBlock {
            name: name.map(str::to_owned),
            instrs: Vec::new(),
        });
        self.current = Some(id);
        id
    }

    pub fn switch_to(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    // Terminators

    pub fn ret(&mut self, value: Option<ValueRef>) -> Result<ValueRef> {
        let void = self.module.types_mut().void();
        self.append(void, InstrKind::Ret { value })
    }

    pub fn jump(&mut self, target: BlockId) -> Result<ValueRef> {
        let void = self.module.types_mut().void();
        self.append(void, InstrKind::Jump { target })
    }

    pub fn branch(
        &mut self,
        cond: ValueRef,
        on_true: BlockId,
        on_false: BlockId,
    ) -> Result<ValueRef> {
        let void = self.module.types_mut().void();
        self.append(
            void,
            InstrKind::Branch {
                on_true,
                on_false,
                cond,
            },
        )
    }

    pub fn switch(
        &mut self,
        cond: ValueRef,
        default: BlockId,
        cases: Vec<(ValueRef, BlockId)>,
    ) -> Result<ValueRef> {
        let void = self.module.types_mut().void();
        self.append(
            void,
            InstrKind::Switch {
                cond,
                default,
                cases,
            },
        )
    }

    pub fn unreachable(&mut self) -> Result<ValueRef> {
        let void = self.module.types_mut().void();
        self.append(void, InstrKind::Unreachable)
    }

    // Value-producing instructions

    pub fn phi(&mut self, ty: TypeId, edges: Vec<(ValueRef, BlockId)>) -> Result<ValueRef> {
        self.append(ty, InstrKind::Phi { edges })
    }

    pub fn cast(&mut self, op: CastOp, value: ValueRef, to: TypeId) -> Result<ValueRef> {
        self.append(to, InstrKind::Cast { op, value, to })
    }

    pub fn binop(&mut self, op: BinOp, lhs: ValueRef, rhs: ValueRef) -> Result<ValueRef> {
        let ty = self.module.value_type(lhs);
        self.append(ty, InstrKind::Binop { op, lhs, rhs })
    }

    pub fn icmp(&mut self, pred: IcmpPred, lhs: ValueRef, rhs: ValueRef) -> Result<ValueRef> {
        let ty = self.module.types_mut().int(1);
        self.append(ty, InstrKind::Icmp { pred, lhs, rhs })
    }

    pub fn load(
        &mut self,
        ty: TypeId,
        ptr: ValueRef,
        align: Option<u64>,
        volatile: bool,
    ) -> Result<ValueRef> {
        self.append(
            ty,
            InstrKind::Load {
                ptr,
                align,
                volatile,
            },
        )
    }

    pub fn store(
        &mut self,
        ptr: ValueRef,
        value: ValueRef,
        align: Option<u64>,
        volatile: bool,
    ) -> Result<ValueRef> {
        let void = self.module.types_mut().void();
        self.append(
            void,
            InstrKind::Store {
                ptr,
                value,
                align,
                volatile,
            },
        )
    }

    /// `operands` is the pointer followed by the indices; `elem_ty` is the
    /// type the pointer operand points at.
    pub fn gep(
        &mut self,
        inbounds: bool,
        elem_ty: TypeId,
        operands: Vec<ValueRef>,
    ) -> Result<ValueRef> {
        debug_assert!(!operands.is_empty());
        let ty = self.module.value_type(operands[0]);
        self.append(
            ty,
            InstrKind::Gep {
                inbounds,
                elem_ty,
                operands,
            },
        )
    }

    pub fn extract_value(&mut self, aggr: ValueRef, index: u64) -> Result<ValueRef> {
        let aggr_ty = self.module.value_type(aggr);
        let ty = self.element_type(aggr_ty, index)?;
        self.append(ty, InstrKind::ExtractValue { aggr, index })
    }

    pub fn insert_value(
        &mut self,
        aggr: ValueRef,
        elem: ValueRef,
        index: u64,
    ) -> Result<ValueRef> {
        let ty = self.module.value_type(aggr);
        self.append(ty, InstrKind::InsertValue { aggr, elem, index })
    }

    pub fn call(
        &mut self,
        callee: ValueRef,
        sig: TypeId,
        args: Vec<ValueRef>,
        cconv: CallConv,
        tail: TailKind,
    ) -> Result<ValueRef> {
        let ty = self.module.types().return_type(sig).unwrap_or(sig);
        self.append(
            ty,
            InstrKind::Call {
                callee,
                sig,
                args,
                cconv,
                tail,
            },
        )
    }

    /// Attach a metadata node to an instruction under a kind name
    /// (e.g. `"dbg"`).
    pub fn attach_metadata(
        &mut self,
        instr: ValueRef,
        kind: impl Into<String>,
        node: ValueRef,
    ) {
        if let Value::Instruction(i) = &mut self.module_values_mut()[instr.index()] {
            i.metadata.push((kind.into(), node));
        }
    }

    pub fn finish(self) -> ValueRef {
        self.func
    }

    // Private

    fn append(&mut self, ty: TypeId, kind: InstrKind) -> Result<ValueRef> {
        let block = self.current.ok_or(Error::NoCurrentBlock)?;
        let instr = self.module.push(Value::Instruction(Instruction {
            ty,
            kind,
            metadata: Vec::new(),
        }));
        match self.module.function_mut(self.func) {
            Ok(f) => f.blocks[block.index()].instrs.push(instr),
            Err(_) => unreachable!("builder always points at a function"),
        }
        Ok(instr)
    }

    fn element_type(&self, aggr_ty: TypeId, index: u64) -> Result<TypeId> {
        match self.module.types().get(aggr_ty) {
            Type::Array { elem, .. } => Ok(*elem),
            Type::Struct { fields, .. } => fields
                .get(index as usize)
                .copied()
                .ok_or(Error::NoSuchElement(index)),
            _ => Err(Error::NoSuchElement(index)),
        }
    }

    fn module_values_mut(&mut self) -> &mut [Value] {
        self.module.values_mut()
    }
}
