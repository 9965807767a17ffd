//! `Adapter` and `Cursor` — the boundary between the mapper and a live
//! database connection.
//!
//! Both traits are object-safe. An adapter hands out a cursor only for the
//! duration of the `visit` callback passed to `query`; the cursor (and the
//! statement or connection it borrows) is released when that callback
//! returns, whether it succeeded, failed, or stopped reading early.

use std::sync::Arc;

use crate::errors::Result;
use crate::value::Value;

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Driver-reported id of the last inserted row, where the driver has one.
    pub last_insert_id: Option<i64>,
}

/// Forward-only view over a query's result rows.
pub trait Cursor {
    /// Column names in result order.
    fn columns(&self) -> &[String];

    /// The next row's values, in `columns()` order, or `None` when done.
    fn next_row(&mut self) -> Result<Option<Vec<Value>>>;
}

/// A database-access backend.
///
/// Calls block until the statement completes or fails. Implementations
/// must not retry, and must wrap driver failures in `AdapterError`
/// annotated with the SQL text and argument count.
pub trait Adapter {
    /// Dialect identifier: `postgres`, `mysql`, `sqlite3` or `sqlserver`.
    fn dialect(&self) -> &str;

    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult>;

    fn query(
        &self,
        sql: &str,
        args: &[Value],
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()>;

    /// Run `body` inside BEGIN/COMMIT, rolling back if it returns `Err`.
    /// Adapters already inside a transaction run `body` directly.
    fn transaction(&self, body: &mut dyn FnMut(&dyn Adapter) -> Result<()>) -> Result<()>;

    fn close(&self) -> Result<()>;
}

impl<T: Adapter + ?Sized> Adapter for Arc<T> {
    fn dialect(&self) -> &str {
        (**self).dialect()
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        (**self).execute(sql, args)
    }

    fn query(
        &self,
        sql: &str,
        args: &[Value],
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        (**self).query(sql, args, visit)
    }

    fn transaction(&self, body: &mut dyn FnMut(&dyn Adapter) -> Result<()>) -> Result<()> {
        (**self).transaction(body)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}
