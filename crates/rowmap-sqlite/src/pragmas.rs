//! SQLite PRAGMA configuration.
//!
//! Must be called on every connection immediately after opening.

use rusqlite::Connection;

/// Configure a read-write connection.
///
/// - WAL for concurrent readers during writes
/// - busy_timeout for lock contention; a statement that waits longer fails
///   with a busy error instead of retrying
/// - NORMAL synchronous for WAL durability trade-off
pub fn configure_connection(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        "
    ))
}

/// Configure a reader. The journal mode is owned by the writer, so it is
/// left alone here; `query_only` rejects accidental writes.
pub fn configure_readonly_connection(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        PRAGMA query_only = ON;
        "
    ))
}
