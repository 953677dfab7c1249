//! Values: constants, metadata, instructions, and the symbolic enums the
//! wire format translates to integers.

use crate::module::{Argument, Declaration, Function, Global};
use crate::types::TypeId;

/// Index into a module's value arena.
///
/// Every referenceable entity (global, function, argument, instruction,
/// constant, metadata node) is a value with exactly one `ValueRef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueRef(pub(crate) u32);

impl ValueRef {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a basic block within its function, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub enum Value {
    Global(Global),
    Function(Function),
    Declaration(Declaration),
    Argument(Argument),
    Constant(Constant),
    Metadata(Metadata),
    Instruction(Instruction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Int { ty: TypeId, value: i64 },
    Null { ty: TypeId },
    Undef { ty: TypeId },
    /// Constant array or struct; elements are constants.
    Aggregate { ty: TypeId, elems: Vec<ValueRef> },
}

impl Constant {
    pub fn ty(&self) -> TypeId {
        match self {
            Constant::Int { ty, .. }
            | Constant::Null { ty }
            | Constant::Undef { ty }
            | Constant::Aggregate { ty, .. } => *ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    String(String),
    /// Operands reference other metadata values.
    Tuple(Vec<ValueRef>),
    /// A constant wrapped as metadata. `ty` is the constant's type.
    Value { ty: TypeId, value: ValueRef },
}

/// An instruction: its result type (`Void` for non-value-producing ones),
/// its operation, and any attached metadata as `(kind name, node)` pairs.
#[derive(Debug)]
pub struct Instruction {
    pub ty: TypeId,
    pub kind: InstrKind,
    pub metadata: Vec<(String, ValueRef)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrKind {
    Ret {
        value: Option<ValueRef>,
    },
    Jump {
        target: BlockId,
    },
    Branch {
        on_true: BlockId,
        on_false: BlockId,
        cond: ValueRef,
    },
    Switch {
        cond: ValueRef,
        default: BlockId,
        cases: Vec<(ValueRef, BlockId)>,
    },
    Unreachable,
    Phi {
        edges: Vec<(ValueRef, BlockId)>,
    },
    Cast {
        op: CastOp,
        value: ValueRef,
        to: TypeId,
    },
    Binop {
        op: BinOp,
        lhs: ValueRef,
        rhs: ValueRef,
    },
    Icmp {
        pred: IcmpPred,
        lhs: ValueRef,
        rhs: ValueRef,
    },
    Load {
        ptr: ValueRef,
        align: Option<u64>,
        volatile: bool,
    },
    Store {
        ptr: ValueRef,
        value: ValueRef,
        align: Option<u64>,
        volatile: bool,
    },
    Gep {
        inbounds: bool,
        /// Source element type the pointer operand points at.
        elem_ty: TypeId,
        /// Pointer operand followed by the indices.
        operands: Vec<ValueRef>,
    },
    ExtractValue {
        aggr: ValueRef,
        index: u64,
    },
    InsertValue {
        aggr: ValueRef,
        elem: ValueRef,
        index: u64,
    },
    Call {
        callee: ValueRef,
        /// Callee signature type, written explicitly on the wire.
        sig: TypeId,
        args: Vec<ValueRef>,
        cconv: CallConv,
        tail: TailKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
    External,
    Weak,
    Appending,
    Internal,
    Linkonce,
    Dllimport,
    Dllexport,
    ExternWeak,
    Common,
    Private,
    WeakOdr,
    LinkonceOdr,
    AvailableExternally,
}

impl Linkage {
    /// Whether symbols with this linkage resolve within the module.
    #[inline]
    pub fn is_local(self) -> bool {
        matches!(self, Linkage::Private | Linkage::Internal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallConv {
    C,
    Fast,
    Cold,
    WebkitJs,
    AnyReg,
    PreserveMost,
    PreserveAll,
    Swift,
    CxxFastTls,
    X86Stdcall,
    X86Fastcall,
    ArmApcs,
    ArmAapcs,
    ArmAapcsVfp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOp {
    Trunc,
    Zext,
    Sext,
    FpToUi,
    FpToSi,
    UiToFp,
    SiToFp,
    FpTrunc,
    FpExt,
    PtrToInt,
    IntToPtr,
    Bitcast,
    AddrSpaceCast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Udiv,
    Sdiv,
    Urem,
    Srem,
    Shl,
    Lshr,
    Ashr,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcmpPred {
    Eq,
    Ne,
    Ugt,
    Uge,
    Ult,
    Ule,
    Sgt,
    Sge,
    Slt,
    Sle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Default,
    Hidden,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TailKind {
    #[default]
    None,
    Tail,
    MustTail,
    NoTail,
}
