use super::error_code::{self, ErrorCode};
use super::{AdapterError, CoerceError};

/// Top-level error type for rowmap.
/// Every public operation returns this; nothing is logged or retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid mapping for {type_name}: {reason}")]
    InvalidMapping { type_name: String, reason: String },

    #[error("no columns to insert into {table}")]
    NoColumns { table: String },

    #[error("missing primary key {column} for {table}")]
    MissingPrimaryKey { table: String, column: String },

    #[error("cannot scan column {column} into field {field}: {source}")]
    ScanTypeMismatch {
        column: String,
        field: String,
        source: CoerceError,
    },

    #[error("record not found: {context}")]
    NotFound { context: String },

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn invalid_mapping(type_name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMapping {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl ErrorCode for Error {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMapping { .. } => error_code::INVALID_MAPPING,
            Self::NoColumns { .. } => error_code::NO_COLUMNS,
            Self::MissingPrimaryKey { .. } => error_code::MISSING_PRIMARY_KEY,
            Self::ScanTypeMismatch { .. } => error_code::SCAN_TYPE_MISMATCH,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Adapter(e) => e.error_code(),
            Self::InvalidArgument(_) => error_code::INVALID_ARGUMENT,
            Self::Config(_) => error_code::CONFIG_ERROR,
        }
    }
}

/// Convenience type alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
