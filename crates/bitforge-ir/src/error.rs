//! Error type for IR construction.

use thiserror::Error;

/// Failure modes of building the IR object graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("type #{0} is not an opaque named struct")]
    NotAnOpaqueStruct(usize),

    #[error("no block selected; create or switch to a basic block first")]
    NoCurrentBlock,

    #[error("value is not a constant")]
    NotAConstant,

    #[error("aggregate type has no element at index {0}")]
    NoSuchElement(u64),

    #[error("value is not a function definition")]
    NotAFunction,
}

pub type Result<T> = std::result::Result<T, Error>;
