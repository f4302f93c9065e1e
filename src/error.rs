// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

/// Which bound a positional sequence violated during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityBound {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
}

impl fmt::Display for ArityBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArityBound::Exactly(n) => write!(f, "a {n}-sequence"),
            ArityBound::AtLeast(n) => write!(f, "an at least {n}-sequence"),
            ArityBound::AtMost(n) => write!(f, "an at most {n}-sequence"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("record type exceeds the {limit}-field limit ({actual} fields)")]
    TooManyFields { limit: usize, actual: usize },
    #[error("out of memory while allocating {0}")]
    OutOfMemory(&'static str),
    #[error("{type_name}() takes {bound} ({actual}-sequence given)")]
    ArityMismatch {
        type_name: SmolStr,
        bound: ArityBound,
        actual: usize,
    },
    #[error("lookup of field '{field}' failed: {reason}")]
    LookupFailure { field: SmolStr, reason: String },
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("unhashable value: {0}")]
    Unhashable(&'static str),
    #[error("host object error: {0}")]
    Host(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("unknown record type: {0}")]
    UnknownType(SmolStr),
    #[error("record type already registered: {0}")]
    AlreadyRegistered(SmolStr),
    #[error("record type {name} still has {holders} live holder(s)")]
    TypeInUse { name: SmolStr, holders: usize },
}

impl From<std::collections::TryReserveError> for RecordError {
    fn from(_: std::collections::TryReserveError) -> Self {
        RecordError::OutOfMemory("record storage")
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        RecordError::Serialization(e.to_string())
    }
}
