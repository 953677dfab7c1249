//! Low-level writer for the LLVM bitstream container format.
//!
//! A bitstream is a self-describing sequence of nested blocks and records
//! packed at bit granularity. Records can be written raw (`UNABBREV_RECORD`,
//! everything VBR6) or through an abbreviation, a declared operand layout
//! that a reader learns once and then applies to every matching record.
//!
//! # Example
//!
//! ```
//! use bitforge_stream::{Abbr, BitStream, Operand, RecordValue};
//!
//! let mut stream = BitStream::new();
//! stream.enter_block(8, 4)?;
//! stream.define_abbr(Abbr::new("source", vec![
//!     Operand::Literal(16),
//!     Operand::Array(Box::new(Operand::Char6)),
//! ]))?;
//! stream.write_record("source", &[RecordValue::chars("hello_world")])?;
//! stream.end_block()?;
//! let bytes = stream.end()?;
//! # assert!(!bytes.is_empty());
//! # Ok::<(), bitforge_stream::Error>(())
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod abbrev;
mod bit_writer;
mod block;
mod byte_writer;
mod error;
mod stream;

#[cfg(test)]
mod bit_writer_tests;
#[cfg(test)]
mod byte_writer_tests;
#[cfg(test)]
mod stream_tests;

pub use abbrev::{Abbr, Operand, RecordValue};
pub use bit_writer::BitWriter;
pub use byte_writer::{ByteWriter, Reservation};
pub use error::{Error, Result};
pub use stream::{BitStream, BlockInfo};
