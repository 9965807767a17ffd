//! Backend-facing traits.

pub mod adapter;

pub use adapter::{Adapter, Cursor, ExecResult};
