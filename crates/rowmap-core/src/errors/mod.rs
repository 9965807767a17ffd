mod adapter_error;
mod coerce_error;
pub mod error_code;
mod rowmap_error;

pub use adapter_error::{AdapterError, AdapterErrorKind};
pub use coerce_error::CoerceError;
pub use error_code::ErrorCode;
pub use rowmap_error::{Error, Result};
