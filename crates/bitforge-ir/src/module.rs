//! The module: one value arena, one type store, and the top-level symbol
//! lists in input order.

use crate::attrs::AttributeList;
use crate::builder::FunctionBuilder;
use crate::error::{Error, Result};
use crate::types::{TypeId, TypeStore};
use crate::values::{CallConv, Constant, Linkage, Metadata, Value, ValueRef};

#[derive(Debug)]
pub struct Global {
    pub name: String,
    /// Pointer type under which the global is addressed.
    pub ty: TypeId,
    pub content_ty: TypeId,
    pub is_constant: bool,
    pub init: Option<ValueRef>,
    pub linkage: Linkage,
    pub attrs: AttributeList,
}

/// A function definition: declaration fields plus a body.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    /// Signature type. References to the function as data use a pointer.
    pub ty: TypeId,
    pub linkage: Linkage,
    pub cconv: CallConv,
    pub attrs: AttributeList,
    pub return_attrs: AttributeList,
    pub param_attrs: Vec<AttributeList>,
    pub args: Vec<ValueRef>,
    pub blocks: Vec<BasicBlock>,
}

/// An external function declaration, body elsewhere.
#[derive(Debug)]
pub struct Declaration {
    pub name: String,
    pub ty: TypeId,
    pub linkage: Linkage,
    pub cconv: CallConv,
    pub attrs: AttributeList,
    pub return_attrs: AttributeList,
    pub param_attrs: Vec<AttributeList>,
}

#[derive(Debug)]
pub struct Argument {
    pub ty: TypeId,
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct BasicBlock {
    pub name: Option<String>,
    pub instrs: Vec<ValueRef>,
}

/// An in-memory program: what the encoder consumes.
#[derive(Debug)]
pub struct Module {
    source_name: Option<String>,
    types: TypeStore,
    values: Vec<Value>,
    globals: Vec<ValueRef>,
    functions: Vec<ValueRef>,
    declarations: Vec<ValueRef>,
    metadata_ty: TypeId,
}

impl Module {
    pub fn new() -> Self {
        let mut types = TypeStore::new();
        let metadata_ty = types.metadata();
        Self {
            source_name: None,
            types,
            values: Vec::new(),
            globals: Vec::new(),
            functions: Vec::new(),
            declarations: Vec::new(),
            metadata_ty,
        }
    }

    pub fn with_source(name: impl Into<String>) -> Self {
        let mut module = Self::new();
        module.source_name = Some(name.into());
        module
    }

    #[inline]
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    #[inline]
    pub fn types(&self) -> &TypeStore {
        &self.types
    }

    #[inline]
    pub fn types_mut(&mut self) -> &mut TypeStore {
        &mut self.types
    }

    #[inline]
    pub fn value(&self, v: ValueRef) -> &Value {
        &self.values[v.index()]
    }

    #[inline]
    pub fn globals(&self) -> &[ValueRef] {
        &self.globals
    }

    #[inline]
    pub fn functions(&self) -> &[ValueRef] {
        &self.functions
    }

    #[inline]
    pub fn declarations(&self) -> &[ValueRef] {
        &self.declarations
    }

    /// Type of any value in the arena.
    pub fn value_type(&self, v: ValueRef) -> TypeId {
        match self.value(v) {
            Value::Global(g) => g.ty,
            Value::Function(f) => f.ty,
            Value::Declaration(d) => d.ty,
            Value::Argument(a) => a.ty,
            Value::Constant(c) => c.ty(),
            Value::Metadata(_) => self.metadata_ty,
            Value::Instruction(i) => i.ty,
        }
    }

    // Symbols

    /// Add a global variable holding a `content_ty` value; its own type is
    /// a pointer to the content.
    pub fn add_global(
        &mut self,
        name: impl Into<String>,
        content_ty: TypeId,
        is_constant: bool,
        linkage: Linkage,
        init: Option<ValueRef>,
    ) -> ValueRef {
        let ty = self.types.ptr(content_ty);
        let v = self.push(Value::Global(Global {
            name: name.into(),
            ty,
            content_ty,
            is_constant,
            init,
            linkage,
            attrs: AttributeList::new(),
        }));
        self.globals.push(v);
        v
    }

    /// Declare an external function.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        sig: TypeId,
        linkage: Linkage,
        cconv: CallConv,
    ) -> ValueRef {
        let param_count = match self.types.get(sig) {
            crate::types::Type::Signature { params, .. } => params.len(),
            _ => 0,
        };
        let v = self.push(Value::Declaration(Declaration {
            name: name.into(),
            ty: sig,
            linkage,
            cconv,
            attrs: AttributeList::new(),
            return_attrs: AttributeList::new(),
            param_attrs: vec![AttributeList::new(); param_count],
        }));
        self.declarations.push(v);
        v
    }

    /// Start a function definition. Arguments are created from the
    /// signature's parameter types; the body is filled through the
    /// returned builder.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        sig: TypeId,
        linkage: Linkage,
        cconv: CallConv,
    ) -> FunctionBuilder<'_> {
        let params = match self.types.get(sig) {
            crate::types::Type::Signature { params, .. } => params.clone(),
            _ => Vec::new(),
        };
        let args = params
            .iter()
            .map(|ty| self.push(Value::Argument(Argument { ty: *ty, name: None })))
            .collect::<Vec<_>>();

        let v = self.push(Value::Function(Function {
            name: name.into(),
            ty: sig,
            linkage,
            cconv,
            attrs: AttributeList::new(),
            return_attrs: AttributeList::new(),
            param_attrs: vec![AttributeList::new(); params.len()],
            args,
            blocks: Vec::new(),
        }));
        self.functions.push(v);
        FunctionBuilder::new(self, v)
    }

    pub fn function(&self, v: ValueRef) -> Result<&Function> {
        match self.value(v) {
            Value::Function(f) => Ok(f),
            _ => Err(Error::NotAFunction),
        }
    }

    pub fn function_mut(&mut self, v: ValueRef) -> Result<&mut Function> {
        match &mut self.values[v.index()] {
            Value::Function(f) => Ok(f),
            _ => Err(Error::NotAFunction),
        }
    }

    pub fn global_mut(&mut self, v: ValueRef) -> Option<&mut Global> {
        match &mut self.values[v.index()] {
            Value::Global(g) => Some(g),
            _ => None,
        }
    }

    pub fn declaration_mut(&mut self, v: ValueRef) -> Option<&mut Declaration> {
        match &mut self.values[v.index()] {
            Value::Declaration(d) => Some(d),
            _ => None,
        }
    }

    // Constants
    //
    // Constants are not interned: sharing one across two function bodies
    // would leak ids across the per-function numbering reset. Each call
    // creates a fresh value.

    pub fn const_int(&mut self, ty: TypeId, value: i64) -> ValueRef {
        self.push(Value::Constant(Constant::Int { ty, value }))
    }

    pub fn const_null(&mut self, ty: TypeId) -> ValueRef {
        self.push(Value::Constant(Constant::Null { ty }))
    }

    pub fn const_undef(&mut self, ty: TypeId) -> ValueRef {
        self.push(Value::Constant(Constant::Undef { ty }))
    }

    pub fn const_aggregate(&mut self, ty: TypeId, elems: Vec<ValueRef>) -> ValueRef {
        self.push(Value::Constant(Constant::Aggregate { ty, elems }))
    }

    // Metadata

    pub fn md_string(&mut self, value: impl Into<String>) -> ValueRef {
        self.push(Value::Metadata(Metadata::String(value.into())))
    }

    pub fn md_tuple(&mut self, operands: Vec<ValueRef>) -> ValueRef {
        self.push(Value::Metadata(Metadata::Tuple(operands)))
    }

    /// Wrap a constant (or a function symbol) as a metadata node.
    pub fn md_value(&mut self, value: ValueRef) -> Result<ValueRef> {
        let ty = match self.value(value) {
            Value::Constant(c) => c.ty(),
            Value::Function(f) => f.ty,
            Value::Declaration(d) => d.ty,
            Value::Global(g) => g.ty,
            _ => return Err(Error::NotAConstant),
        };
        Ok(self.push(Value::Metadata(Metadata::Value { ty, value })))
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    pub(crate) fn push(&mut self, value: Value) -> ValueRef {
        let v = ValueRef(self.values.len() as u32);
        self.values.push(value);
        v
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}
