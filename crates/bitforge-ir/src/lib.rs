//! In-memory IR object model for the bitforge bitcode encoder.
//!
//! A [`Module`] owns a type store and a value arena; globals, function
//! definitions, declarations, constants, metadata nodes, and instructions
//! are all arena values addressed by [`ValueRef`]. Function bodies are
//! assembled through [`FunctionBuilder`].
//!
//! # Example
//!
//! ```
//! use bitforge_ir::{CallConv, Linkage, Module};
//!
//! let mut module = Module::new();
//! let i32ty = module.types_mut().int(32);
//! let sig = module.types_mut().signature(i32ty, vec![i32ty]);
//!
//! let mut f = module.define("id", sig, Linkage::External, CallConv::C);
//! f.block(Some("entry"));
//! let arg = f.arg(0);
//! f.ret(Some(arg))?;
//! f.finish();
//! # Ok::<(), bitforge_ir::Error>(())
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod attrs;
mod builder;
mod error;
mod module;
mod types;
mod values;


pub use attrs::{AttrValue, Attribute, AttributeList};
pub use builder::FunctionBuilder;
pub use error::{Error, Result};
pub use module::{Argument, BasicBlock, Declaration, Function, Global, Module};
pub use types::{Type, TypeId, TypeStore};
pub use values::{
    BinOp, BlockId, CallConv, CastOp, Constant, IcmpPred, InstrKind, Instruction, Linkage,
    Metadata, TailKind, Value, ValueRef, Visibility,
};
