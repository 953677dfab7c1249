//! Attribute lists for functions, return values, parameters, and globals.
//!
//! Keys are plain strings at this level; the encoder decides whether a key
//! maps to a well-known wire id or travels as a custom string attribute.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Int(u64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<AttrValue>,
}

impl Attribute {
    /// Valueless attribute, e.g. `noinline`.
    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Attribute with an integer payload, e.g. `align 8`.
    pub fn int(key: impl Into<String>, value: u64) -> Self {
        Self {
            key: key.into(),
            value: Some(AttrValue::Int(value)),
        }
    }

    /// Custom string attribute with a string payload.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(AttrValue::Str(value.into())),
        }
    }
}

pub type AttributeList = Vec<Attribute>;
