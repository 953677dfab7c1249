use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Stream(#[from] bitforge_stream::Error),

    #[error(transparent)]
    Ir(#[from] bitforge_ir::Error),

    #[error("value was never enumerated")]
    NotEnumerated,

    #[error("value id {got} referenced before its definition (last emitted {last})")]
    ValueOrder { last: u64, got: u64 },

    #[error("function body closed below the module baseline (last emitted {last}, baseline {baseline})")]
    BaselineOrder { last: u64, baseline: u64 },

    #[error("type was never collected for the type table")]
    UnknownType,

    #[error("alignment {0} is not a power of two")]
    InvalidAlignment(u64),

    #[error("well-known attribute {0:?} cannot carry a string value")]
    AttributeValue(String),

    #[error("metadata kind {0:?} was never interned")]
    UnknownMetadataKind(String),

    #[error("operand defined after its use (forward reference)")]
    ForwardReference,
}

pub type Result<T> = std::result::Result<T, Error>;
