//! LLVM bitcode encoder.
//!
//! Takes a [`bitforge_ir::Module`] and produces the bytes of a `.bc`
//! file: value enumeration, the type table, constants, metadata, function
//! bodies, and the string table, all layered over the
//! [`bitforge_stream`] container format.
//!
//! # Example
//!
//! ```
//! use bitforge::ModuleWriter;
//! use bitforge_ir::{CallConv, Linkage, Module};
//!
//! let mut module = Module::with_source("demo.ll");
//! let i32ty = module.types_mut().int(32);
//! let sig = module.types_mut().signature(i32ty, vec![i32ty]);
//!
//! let mut f = module.define("id", sig, Linkage::External, CallConv::C);
//! f.block(Some("entry"));
//! let arg = f.arg(0);
//! f.ret(Some(arg))?;
//! f.finish();
//!
//! let bytes = ModuleWriter::new(module).build()?;
//! assert_eq!(&bytes[..4], &[0x42, 0x43, 0xc0, 0xde]);
//! # Ok::<(), bitforge::Error>(())
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod blocks;
pub mod codes;
mod encoding;
mod enumerator;
mod error;
mod module;
mod strtab;

#[cfg(test)]
mod enumerator_tests;
#[cfg(test)]
mod module_tests;

pub use enumerator::Enumerator;
pub use error::{Error, Result};
pub use module::ModuleWriter;
pub use strtab::{Strtab, StrtabRef};
