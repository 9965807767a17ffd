//! Stable string codes for every error surfaced by rowmap.
//!
//! Codes are part of the public contract: callers may match on them in
//! logs or across FFI boundaries where the Rust enum is not available.

pub const INVALID_MAPPING: &str = "INVALID_MAPPING";
pub const NO_COLUMNS: &str = "NO_COLUMNS";
pub const MISSING_PRIMARY_KEY: &str = "MISSING_PRIMARY_KEY";
pub const SCAN_TYPE_MISMATCH: &str = "SCAN_TYPE_MISMATCH";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const ADAPTER_ERROR: &str = "ADAPTER_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const INTERRUPTED: &str = "INTERRUPTED";
pub const CONSTRAINT_VIOLATION: &str = "CONSTRAINT_VIOLATION";
pub const ADAPTER_CLOSED: &str = "ADAPTER_CLOSED";
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";

/// Maps an error to its stable code.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}
