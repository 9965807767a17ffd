//! `PooledSqliteAdapter` — writer + read pool with round-robin selection.
//!
//! Statements that only read (`SELECT`, `WITH`) go to a reader; everything
//! else, and every transaction, goes to the single writer.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use rowmap_core::{Adapter, AdapterError, AdapterErrorKind, Cursor, Error, ExecResult, Result, RowmapConfig, Value};
use rusqlite::{Connection, OpenFlags};

use crate::connection::ConnectionAdapter;
use crate::conversions::close_connection;
use crate::pragmas;
use crate::DIALECT;

/// Connection pool: 1 writer + N read-only readers.
///
/// WAL mode is enabled by the writer so readers see committed writes
/// without blocking it. A slot holds `None` once the pool is closed.
pub struct PooledSqliteAdapter {
    writer: Slot,
    readers: Vec<Slot>,
    read_index: AtomicUsize,
}

type Slot = Mutex<Option<Connection>>;

impl PooledSqliteAdapter {
    /// Open a file-backed pool with `config.read_pool_size` readers.
    pub fn open(path: &Path, config: &RowmapConfig) -> Result<Self> {
        let busy_timeout = config.effective_busy_timeout_ms();
        let pool_size = config.effective_read_pool_size();

        let writer = Connection::open(path)
            .map_err(|e| Error::Config(format!("failed to open writer {}: {}", path.display(), e)))?;
        pragmas::configure_connection(&writer, busy_timeout)
            .map_err(|e| Error::Config(format!("failed to configure writer: {}", e)))?;

        let mut readers = Vec::with_capacity(pool_size);
        for i in 0..pool_size {
            let reader = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| Error::Config(format!("failed to open reader {}: {}", i, e)))?;
            pragmas::configure_readonly_connection(&reader, busy_timeout)
                .map_err(|e| Error::Config(format!("failed to configure reader {}: {}", i, e)))?;
            readers.push(Mutex::new(Some(reader)));
        }

        tracing::debug!(path = %path.display(), readers = pool_size, "rowmap-sqlite: pool opened");
        Ok(Self {
            writer: Mutex::new(Some(writer)),
            readers,
            read_index: AtomicUsize::new(0),
        })
    }

    /// In-memory pool. Separate in-memory connections do not share a
    /// database, so there are no readers and reads use the writer.
    pub fn open_in_memory() -> Result<Self> {
        let writer = Connection::open_in_memory()
            .map_err(|e| Error::Config(format!("failed to open in-memory writer: {}", e)))?;
        pragmas::configure_connection(&writer, RowmapConfig::default().effective_busy_timeout_ms())
            .map_err(|e| Error::Config(format!("failed to configure writer: {}", e)))?;

        Ok(Self {
            writer: Mutex::new(Some(writer)),
            readers: Vec::new(),
            read_index: AtomicUsize::new(0),
        })
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    /// Check WAL mode on the writer connection.
    pub fn is_wal_mode(&self) -> bool {
        self.with_writer("PRAGMA journal_mode", 0, |conn| {
            let mut mode = String::new();
            conn.query("PRAGMA journal_mode", &[], &mut |cursor: &mut dyn Cursor| {
                if let Some(row) = cursor.next_row()? {
                    if let Some(Value::Text(text)) = row.into_iter().next() {
                        mode = text;
                    }
                }
                Ok(())
            })?;
            Ok(mode.eq_ignore_ascii_case("wal"))
        })
        .unwrap_or(false)
    }

    fn lock<'a>(
        slot: &'a Slot,
        role: &str,
        sql: &str,
        arg_count: usize,
    ) -> Result<MutexGuard<'a, Option<Connection>>> {
        slot.lock().map_err(|e| {
            AdapterError::new(
                AdapterErrorKind::Other,
                sql,
                arg_count,
                format!("{} lock poisoned: {}", role, e),
            )
            .into()
        })
    }

    /// Run `f` with the slot's connection, or fail with a closed error.
    fn with_slot<T>(
        slot: &Slot,
        role: &str,
        sql: &str,
        arg_count: usize,
        f: impl FnOnce(&ConnectionAdapter<'_>) -> Result<T>,
    ) -> Result<T> {
        let guard = Self::lock(slot, role, sql, arg_count)?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| AdapterError::closed(sql, arg_count))?;
        f(&ConnectionAdapter::new(conn))
    }

    fn with_writer<T>(
        &self,
        sql: &str,
        arg_count: usize,
        f: impl FnOnce(&ConnectionAdapter<'_>) -> Result<T>,
    ) -> Result<T> {
        Self::with_slot(&self.writer, "writer", sql, arg_count, f)
    }

    /// Falls back to the writer if no readers are available (in-memory mode).
    fn with_reader<T>(
        &self,
        sql: &str,
        arg_count: usize,
        f: impl FnOnce(&ConnectionAdapter<'_>) -> Result<T>,
    ) -> Result<T> {
        if self.readers.is_empty() {
            return self.with_writer(sql, arg_count, f);
        }
        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        Self::with_slot(&self.readers[index], "reader", sql, arg_count, f)
    }

    /// Close the slot's connection. A connection the driver refuses to
    /// close stays in the slot.
    fn close_slot(slot: &Slot, role: &str) -> Result<()> {
        let mut guard = Self::lock(slot, role, "", 0)?;
        if let Some(conn) = guard.take() {
            if let Err((conn, e)) = close_connection(conn) {
                tracing::warn!(role, error = %e, "rowmap-sqlite: close failed");
                *guard = Some(conn);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Statements routed to a reader. `RETURNING` makes an otherwise
/// row-producing statement a write.
fn is_read_only(sql: &str) -> bool {
    let head = sql.trim_start();
    let starts_with = |keyword: &str| {
        head.get(..keyword.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
    };
    (starts_with("SELECT") || starts_with("WITH"))
        && !sql.to_ascii_uppercase().contains("RETURNING")
}

impl Adapter for PooledSqliteAdapter {
    fn dialect(&self) -> &str {
        DIALECT
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        self.with_writer(sql, args.len(), |conn| conn.execute(sql, args))
    }

    fn query(
        &self,
        sql: &str,
        args: &[Value],
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        if is_read_only(sql) {
            self.with_reader(sql, args.len(), |conn| conn.query(sql, args, visit))
        } else {
            self.with_writer(sql, args.len(), |conn| conn.query(sql, args, visit))
        }
    }

    fn transaction(&self, body: &mut dyn FnMut(&dyn Adapter) -> Result<()>) -> Result<()> {
        self.with_writer("BEGIN", 0, |conn| conn.transaction(body))
    }

    /// Close every connection, readers before the writer. Idempotent.
    /// Every slot is attempted; the first failure is returned.
    fn close(&self) -> Result<()> {
        let slots = self
            .readers
            .iter()
            .map(|slot| (slot, "reader"))
            .chain(std::iter::once((&self.writer, "writer")));
        let mut first_error = None;
        for (slot, role) in slots {
            if let Err(e) = Self::close_slot(slot, role) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::debug!("rowmap-sqlite: pool closed");
                Ok(())
            }
        }
    }
}
