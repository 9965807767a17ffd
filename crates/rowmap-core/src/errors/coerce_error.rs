//! Conversion failures between `Value` and Rust field types.

/// Raised by `ToValue` / `FromValue` and by generated `Record` accessors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoerceError {
    #[error("cannot convert {found} into {expected}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{value} is out of range for {expected}")]
    OutOfRange { expected: &'static str, value: String },

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("unknown variant {value:?} for {expected}")]
    UnknownVariant { expected: &'static str, value: String },

    #[error("no mapped field at path {0:?}")]
    UnknownField(Vec<usize>),
}

impl CoerceError {
    pub fn mismatch(expected: &'static str, found: &crate::Value) -> Self {
        Self::Mismatch {
            expected,
            found: found.kind(),
        }
    }

    pub fn unknown_field(path: &[usize]) -> Self {
        Self::UnknownField(path.to_vec())
    }
}
