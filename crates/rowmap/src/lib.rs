//! # rowmap
//!
//! Maps record types onto relational tables.
//! Field tags are parsed once per type, SQL is generated for the active
//! dialect, executed through an `Adapter`, and result rows are scanned
//! back into records.
//!
//! ```ignore
//! use rowmap::{args, Db, Provider, Record, Table};
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[rowmap("id,pk,generated")]
//!     id: i64,
//!     #[rowmap("name")]
//!     name: String,
//!     #[rowmap("age")]
//!     age: i32,
//! }
//!
//! let users = Table::new("users");
//! let mut user = User { name: "a".into(), age: 1, ..Default::default() };
//! db.insert(&users, &mut user)?;
//! let found: User = db.query_one(&users, "id = ?", &args![user.id])?;
//! ```

// Lets `#[derive(Record)]` output (which names `::rowmap`) compile inside
// this crate's own tests.
extern crate self as rowmap;

pub mod builder;
pub mod db;
pub mod metadata;
pub mod provider;
pub mod scanner;
pub mod session;
pub mod table;

pub use db::{Db, Tx};
pub use metadata::{describe, FieldMapping, TableDescriptor};
pub use provider::Provider;
pub use rowmap_core::errors::error_code;
pub use rowmap_core::tracing::{init_from_config, init_tracing};
pub use rowmap_core::{
    Adapter, AdapterError, AdapterErrorKind, CoerceError, Cursor, Dialect, Error, ErrorCode,
    ExecResult, FieldTag, FromValue, InsertMethod, Json, Record, Result, RowmapConfig, ToValue,
    Value,
};
pub use rowmap_derive::Record;
pub use session::Session;
pub use table::Table;

/// Build an argument list: `args![1, "a", None::<i64>]`.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}
