//! # rowmap-sqlite
//!
//! `Adapter` implementations over rusqlite.
//!
//! - `SqliteAdapter`: one connection behind a mutex.
//! - `PooledSqliteAdapter`: one writer plus round-robin read-only readers
//!   for file-backed databases.
//!
//! Both report the `sqlite3` dialect and apply the same PRAGMAs on open.

mod connection;
mod conversions;
mod cursor;

pub mod adapter;
pub mod pool;
pub mod pragmas;

pub use adapter::SqliteAdapter;
pub use pool::PooledSqliteAdapter;

/// Dialect name reported by every adapter in this crate.
pub const DIALECT: &str = "sqlite3";
