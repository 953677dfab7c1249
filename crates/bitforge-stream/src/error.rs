//! Error type for the bitstream writer.

use thiserror::Error;

/// Failure modes of the bitstream writer.
///
/// Every variant is a structural-invariant violation on the caller's side.
/// The container format has no tolerance for malformed structure, so any
/// detected violation aborts the build instead of emitting a corrupt stream;
/// a failed writer must be discarded, never retried in place.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid number of bits: {0} (expected 1..=32)")]
    InvalidBitCount(u32),

    #[error("invalid VBR width: {0} (expected 2..=32)")]
    VbrWidth(u32),

    #[error("bit reservation must cover whole bytes, got {0} bits")]
    PartialByteReservation(u32),

    #[error("writer must be byte-aligned before reserving")]
    UnalignedReservation,

    #[error("reservation was not issued by this writer or was already resolved")]
    ForeignReservation,

    #[error("reservation patch is {got} bytes, window is {want}")]
    ReservationSize { want: usize, got: usize },

    #[error("{0} reservation(s) left unresolved at end of stream")]
    PendingReservations(usize),

    #[error("no open block to end")]
    NoOpenBlock,

    #[error("{0} block(s) left open at end of stream")]
    OpenBlocks(usize),

    #[error("abbreviation id width {0} is out of range (expected 2..=32)")]
    AbbrevIdWidth(u32),

    #[error("abbreviation id {0} does not fit into {1} bits")]
    AbbrevIdOverflow(u64, u32),

    #[error("cannot define an abbreviation outside of a block")]
    DefineOutsideBlock,

    #[error("DEFINE_ABBREV inside BLOCKINFO requires a prior SETBID record")]
    NoSetBid,

    #[error("BLOCKINFO block was already written")]
    BlockInfoRewritten,

    #[error("duplicate abbreviation name: {0:?}")]
    DuplicateAbbrev(String),

    #[error("unknown abbreviation: {0:?}")]
    UnknownAbbrev(String),

    #[error("cannot write an abbreviated record outside of a block")]
    RecordOutsideBlock,

    #[error("array abbreviation elements may not be literals, arrays, or blobs")]
    BadArrayElement,

    #[error("abbreviation {name:?} consumes {expected} values, got {got}")]
    RecordArity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("abbreviation operand expected a {expected} value")]
    RecordValueKind { expected: &'static str },

    #[error("value {0:#x} is not encodable as char6 ([a-zA-Z0-9._])")]
    Char6(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
