//! Type arena with structural interning.
//!
//! Structural types (ints, pointers, arrays, signatures, anonymous structs)
//! are deduplicated: building the same shape twice yields the same
//! [`TypeId`]. Named structs are nominal and built in two phases so a
//! struct can contain a pointer to itself.

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Index into a [`TypeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Label,
    Metadata,
    Int {
        bits: u32,
    },
    Pointer {
        pointee: TypeId,
    },
    Array {
        len: u64,
        elem: TypeId,
    },
    /// Function signature. Function values carry this type directly; a
    /// reference to a function as data is a pointer to it.
    Signature {
        ret: TypeId,
        params: Vec<TypeId>,
    },
    Struct {
        /// `None` for anonymous (structural) structs.
        name: Option<String>,
        fields: Vec<TypeId>,
        /// Named structs start opaque until [`TypeStore::set_struct_body`].
        opaque: bool,
    },
}

/// Arena of interned types.
#[derive(Debug, Default)]
pub struct TypeStore {
    types: Vec<Type>,
    /// Structural dedup map. Named structs are never keyed here.
    interned: IndexMap<Type, TypeId>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn void(&mut self) -> TypeId {
        self.intern(Type::Void)
    }

    pub fn label(&mut self) -> TypeId {
        self.intern(Type::Label)
    }

    pub fn metadata(&mut self) -> TypeId {
        self.intern(Type::Metadata)
    }

    pub fn int(&mut self, bits: u32) -> TypeId {
        self.intern(Type::Int { bits })
    }

    pub fn ptr(&mut self, pointee: TypeId) -> TypeId {
        self.intern(Type::Pointer { pointee })
    }

    pub fn array(&mut self, len: u64, elem: TypeId) -> TypeId {
        self.intern(Type::Array { len, elem })
    }

    pub fn signature(&mut self, ret: TypeId, params: Vec<TypeId>) -> TypeId {
        self.intern(Type::Signature { ret, params })
    }

    /// Anonymous struct, interned by field list.
    pub fn anon_struct(&mut self, fields: Vec<TypeId>) -> TypeId {
        self.intern(Type::Struct {
            name: None,
            fields,
            opaque: false,
        })
    }

    /// First phase of a named struct: reserve the id with no body. The id
    /// is usable immediately, e.g. to build a pointer back to the struct.
    pub fn opaque_struct(&mut self, name: impl Into<String>) -> TypeId {
        self.push(Type::Struct {
            name: Some(name.into()),
            fields: Vec::new(),
            opaque: true,
        })
    }

    /// Second phase: fill in the body of an opaque named struct.
    pub fn set_struct_body(&mut self, id: TypeId, fields: Vec<TypeId>) -> Result<()> {
        match self.types.get_mut(id.index()) {
            Some(Type::Struct {
                opaque: opaque @ true,
                fields: body,
                ..
            }) => {
                *body = fields;
                *opaque = false;
                Ok(())
            }
            _ => Err(Error::NotAnOpaqueStruct(id.index())),
        }
    }

    #[inline]
    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Void)
    }

    /// Element type behind a pointer, if `id` is a pointer.
    pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Pointer { pointee } => Some(*pointee),
            _ => None,
        }
    }

    /// Already-interned pointer to `pointee`, without creating one.
    pub fn lookup_ptr(&self, pointee: TypeId) -> Option<TypeId> {
        self.interned.get(&Type::Pointer { pointee }).copied()
    }

    pub fn is_signature(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Signature { .. })
    }

    /// Return type of a signature, if `id` is one.
    pub fn return_type(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Signature { ret, .. } => Some(*ret),
            _ => None,
        }
    }

    fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.interned.get(&ty) {
            return *id;
        }
        let id = self.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }
}
