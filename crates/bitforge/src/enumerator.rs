//! Value numbering.
//!
//! Ids are assigned in emission order: module-level entities first
//! (globals, their initializer constants, functions, declarations), then
//! per function the arguments, the body's constants and metadata, and
//! finally the instructions. The counter resets to the module baseline
//! after each function, so function-local ids are function-relative.

use bitforge_ir::{Constant, InstrKind, Metadata, Module, Value, ValueRef};
use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Where a first-seen constant or metadata node is recorded.
#[derive(Debug, Clone, Copy)]
enum Scope {
    Module,
    Function(ValueRef),
}

#[derive(Debug, Default)]
pub struct Enumerator {
    ids: IndexMap<ValueRef, u64>,
    next: u64,
    /// First id past the module-level entities.
    baseline: u64,
    last_emitted: u64,
    global_constants: Vec<ValueRef>,
    fn_constants: IndexMap<ValueRef, Vec<ValueRef>>,
    fn_metadata: IndexMap<ValueRef, Vec<ValueRef>>,
    kinds: IndexMap<String, u64>,
}

impl Enumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the module and assign every value its id.
    pub fn enumerate(&mut self, module: &Module) {
        for &g in module.globals() {
            self.assign(g);
        }
        for &g in module.globals() {
            if let Value::Global(global) = module.value(g)
                && let Some(init) = global.init
            {
                self.constant(module, init, Scope::Module);
            }
        }
        for &f in module.functions() {
            self.assign(f);
        }
        for &d in module.declarations() {
            self.assign(d);
        }
        self.baseline = self.next;

        for &f in module.functions() {
            self.function(module, f);
        }
    }

    /// Id of an enumerated value.
    pub fn get(&self, v: ValueRef) -> Result<u64> {
        self.ids.get(&v).copied().ok_or(Error::NotEnumerated)
    }

    /// Validate that definition records come out in id order, and return
    /// the id.
    pub fn check_value_order(&mut self, v: ValueRef) -> Result<u64> {
        let id = self.get(v)?;
        if id < self.last_emitted {
            return Err(Error::ValueOrder {
                last: self.last_emitted,
                got: id,
            });
        }
        self.last_emitted = id;
        Ok(id)
    }

    /// Close out a function body: the body must have emitted at least one
    /// record at or past the module baseline. Resets emission-order
    /// tracking so the next body reuses ids starting at the baseline.
    pub fn leave_function(&mut self) -> Result<()> {
        if self.last_emitted < self.baseline {
            return Err(Error::BaselineOrder {
                last: self.last_emitted,
                baseline: self.baseline,
            });
        }
        self.last_emitted = self.baseline;
        Ok(())
    }

    /// Every enumerated value, in id-assignment order.
    pub fn values(&self) -> impl Iterator<Item = ValueRef> + '_ {
        self.ids.keys().copied()
    }

    #[inline]
    pub fn global_constants(&self) -> &[ValueRef] {
        &self.global_constants
    }

    /// Constants first used inside `func`, in first-use order.
    pub fn function_constants(&self, func: ValueRef) -> &[ValueRef] {
        self.fn_constants.get(&func).map_or(&[], Vec::as_slice)
    }

    /// Metadata nodes first used inside `func`, operands before users.
    pub fn function_metadata(&self, func: ValueRef) -> &[ValueRef] {
        self.fn_metadata.get(&func).map_or(&[], Vec::as_slice)
    }

    /// Metadata kind names to their interned ids.
    #[inline]
    pub fn metadata_kinds(&self) -> &IndexMap<String, u64> {
        &self.kinds
    }

    // Private

    fn assign(&mut self, v: ValueRef) {
        self.ids.insert(v, self.next);
        self.next += 1;
    }

    fn constant(&mut self, module: &Module, v: ValueRef, scope: Scope) {
        if self.ids.contains_key(&v) {
            return;
        }
        self.assign(v);
        match scope {
            Scope::Module => self.global_constants.push(v),
            Scope::Function(f) => self.fn_constants.entry(f).or_default().push(v),
        }
        if let Value::Constant(Constant::Aggregate { elems, .. }) = module.value(v) {
            for &elem in elems {
                self.constant(module, elem, scope);
            }
        }
    }

    fn metadata(&mut self, module: &Module, v: ValueRef, func: ValueRef) {
        if self.ids.contains_key(&v) {
            return;
        }
        match module.value(v) {
            Value::Metadata(Metadata::String(_)) => {}
            Value::Metadata(Metadata::Tuple(ops)) => {
                // Operands first, so the node list is topologically sorted.
                for &op in ops {
                    self.metadata(module, op, func);
                }
            }
            Value::Metadata(Metadata::Value { value, .. }) => {
                if matches!(module.value(*value), Value::Constant(_)) {
                    self.constant(module, *value, Scope::Function(func));
                }
            }
            _ => return,
        }
        self.assign(v);
        self.fn_metadata.entry(func).or_default().push(v);
    }

    fn function(&mut self, module: &Module, f: ValueRef) {
        let Value::Function(func) = module.value(f) else {
            return;
        };
        for &arg in &func.args {
            self.assign(arg);
        }

        // First pass: constants and metadata referenced by the body.
        for bb in &func.blocks {
            for &i in &bb.instrs {
                let Value::Instruction(instr) = module.value(i) else {
                    continue;
                };
                let mut ops = Vec::new();
                operand_values(&instr.kind, &mut ops);
                for op in ops {
                    match module.value(op) {
                        Value::Constant(_) => self.constant(module, op, Scope::Function(f)),
                        Value::Metadata(_) => self.metadata(module, op, f),
                        _ => {}
                    }
                }
                for (_, node) in &instr.metadata {
                    self.metadata(module, *node, f);
                }
            }
        }

        // Second pass: instruction results. Void instructions are mapped
        // but consume no id.
        for bb in &func.blocks {
            for &i in &bb.instrs {
                let Value::Instruction(instr) = module.value(i) else {
                    continue;
                };
                if module.types().is_void(instr.ty) {
                    self.ids.insert(i, self.next);
                } else {
                    self.assign(i);
                }
                for (kind, _) in &instr.metadata {
                    self.intern_kind(kind);
                }
            }
        }

        self.next = self.baseline;
    }

    fn intern_kind(&mut self, name: &str) {
        if !self.kinds.contains_key(name) {
            let id = self.kinds.len() as u64;
            self.kinds.insert(name.to_owned(), id);
        }
    }
}

/// Value operands of an instruction, in wire order. Block targets and
/// immediate indices are not values.
fn operand_values(kind: &InstrKind, out: &mut Vec<ValueRef>) {
    match kind {
        InstrKind::Ret { value } => out.extend(value.iter().copied()),
        InstrKind::Jump { .. } | InstrKind::Unreachable => {}
        InstrKind::Branch { cond, .. } => out.push(*cond),
        InstrKind::Switch { cond, cases, .. } => {
            out.push(*cond);
            out.extend(cases.iter().map(|(v, _)| *v));
        }
        InstrKind::Phi { edges } => out.extend(edges.iter().map(|(v, _)| *v)),
        InstrKind::Cast { value, .. } => out.push(*value),
        InstrKind::Binop { lhs, rhs, .. } | InstrKind::Icmp { lhs, rhs, .. } => {
            out.push(*lhs);
            out.push(*rhs);
        }
        InstrKind::Load { ptr, .. } => out.push(*ptr),
        InstrKind::Store { ptr, value, .. } => {
            out.push(*ptr);
            out.push(*value);
        }
        InstrKind::Gep { operands, .. } => out.extend_from_slice(operands),
        InstrKind::ExtractValue { aggr, .. } => out.push(*aggr),
        InstrKind::InsertValue { aggr, elem, .. } => {
            out.push(*aggr);
            out.push(*elem);
        }
        InstrKind::Call { callee, args, .. } => {
            out.push(*callee);
            out.extend_from_slice(args);
        }
    }
}
