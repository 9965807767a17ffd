//! # rowmap-core
//!
//! Foundation crate for rowmap.
//! Defines the value model, the `Record` contract, dialects, the adapter
//! and cursor traits, errors, config and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod dialect;
pub mod errors;
pub mod record;
pub mod tracing;
pub mod traits;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use config::RowmapConfig;
pub use dialect::{Dialect, InsertMethod};
pub use errors::{AdapterError, AdapterErrorKind, CoerceError, Error, ErrorCode, Result};
pub use record::{FieldTag, Record};
pub use traits::{Adapter, Cursor, ExecResult};
pub use value::{FromValue, Json, ToValue, Value};
