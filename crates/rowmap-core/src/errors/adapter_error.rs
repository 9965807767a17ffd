//! Wrapped failures from the underlying connection.
//!
//! An `AdapterError` carries the SQL text and the number of arguments that
//! were bound. Argument values are never recorded.

use std::fmt;

use super::error_code::{self, ErrorCode};

/// Broad classification of an underlying connection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    /// The database was locked by another connection.
    Busy,
    /// The operation was interrupted or cancelled by the connection.
    Interrupted,
    /// A constraint (unique, not null, foreign key, check) was violated.
    Constraint,
    /// The adapter was used after `close`.
    Closed,
    Other,
}

impl fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Busy => "busy",
            Self::Interrupted => "interrupted",
            Self::Constraint => "constraint violation",
            Self::Closed => "adapter closed",
            Self::Other => "adapter error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message} (sql: {sql:?}, args: {arg_count})")]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub sql: String,
    pub arg_count: usize,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AdapterError {
    /// Error without an underlying cause, e.g. a protocol expectation that
    /// the driver did not meet.
    pub fn new(
        kind: AdapterErrorKind,
        sql: impl Into<String>,
        arg_count: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            sql: sql.into(),
            arg_count,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a driver error.
    pub fn wrap<E>(kind: AdapterErrorKind, sql: impl Into<String>, arg_count: usize, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind,
            sql: sql.into(),
            arg_count,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn closed(sql: impl Into<String>, arg_count: usize) -> Self {
        Self::new(AdapterErrorKind::Closed, sql, arg_count, "adapter is closed")
    }
}

impl ErrorCode for AdapterError {
    fn error_code(&self) -> &'static str {
        match self.kind {
            AdapterErrorKind::Busy => error_code::DB_BUSY,
            AdapterErrorKind::Interrupted => error_code::INTERRUPTED,
            AdapterErrorKind::Constraint => error_code::CONSTRAINT_VIOLATION,
            AdapterErrorKind::Closed => error_code::ADAPTER_CLOSED,
            AdapterErrorKind::Other => error_code::ADAPTER_ERROR,
        }
    }
}
