//! `SqliteAdapter` — one connection behind a mutex.
//!
//! Every call takes the lock for its whole duration, including the cursor
//! callback of `query` and the body of `transaction`. Inside a transaction
//! body use the adapter handed to the body, not this one.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rowmap_core::{Adapter, AdapterError, AdapterErrorKind, Cursor, Error, ExecResult, Result, RowmapConfig, Value};
use rusqlite::Connection;

use crate::connection::ConnectionAdapter;
use crate::conversions::close_connection;
use crate::pragmas;
use crate::DIALECT;

pub struct SqliteAdapter {
    conn: Mutex<Option<Connection>>,
}

impl SqliteAdapter {
    /// Open a file-backed database with default settings.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_config(path, &RowmapConfig::default())
    }

    pub fn open_with_config(path: &Path, config: &RowmapConfig) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::Config(format!("failed to open {}: {}", path.display(), e)))?;
        Self::from_connection(conn, config)
    }

    /// Private in-memory database, visible only through this adapter.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Config(format!("failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn, &RowmapConfig::default())
    }

    /// Wrap a connection the caller opened, applying the same pragmas as
    /// `open_with_config`.
    pub fn from_connection(conn: Connection, config: &RowmapConfig) -> Result<Self> {
        pragmas::configure_connection(&conn, config.effective_busy_timeout_ms())
            .map_err(|e| Error::Config(format!("failed to configure connection: {}", e)))?;
        tracing::debug!("rowmap-sqlite: connection opened");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn lock(&self, sql: &str, arg_count: usize) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|e| {
            AdapterError::new(
                AdapterErrorKind::Other,
                sql,
                arg_count,
                format!("connection lock poisoned: {}", e),
            )
            .into()
        })
    }

    /// Run `f` with the connection, or fail with a closed error.
    fn with_conn<T>(
        &self,
        sql: &str,
        arg_count: usize,
        f: impl FnOnce(&ConnectionAdapter<'_>) -> Result<T>,
    ) -> Result<T> {
        let guard = self.lock(sql, arg_count)?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| AdapterError::closed(sql, arg_count))?;
        f(&ConnectionAdapter::new(conn))
    }
}

impl Adapter for SqliteAdapter {
    fn dialect(&self) -> &str {
        DIALECT
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        self.with_conn(sql, args.len(), |conn| conn.execute(sql, args))
    }

    fn query(
        &self,
        sql: &str,
        args: &[Value],
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        self.with_conn(sql, args.len(), |conn| conn.query(sql, args, visit))
    }

    fn transaction(&self, body: &mut dyn FnMut(&dyn Adapter) -> Result<()>) -> Result<()> {
        self.with_conn("BEGIN", 0, |conn| conn.transaction(body))
    }

    /// Close the connection. Idempotent.
    fn close(&self) -> Result<()> {
        let mut guard = self.lock("", 0)?;
        if let Some(conn) = guard.take() {
            if let Err((conn, e)) = close_connection(conn) {
                tracing::warn!(error = %e, "rowmap-sqlite: close failed");
                *guard = Some(conn);
                return Err(e);
            }
            tracing::debug!("rowmap-sqlite: connection closed");
        }
        Ok(())
    }
}
