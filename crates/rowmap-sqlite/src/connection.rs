//! `ConnectionAdapter` — the `Adapter` impl over one borrowed connection.
//! The owning adapters lock a connection and hand it to this type.

use rowmap_core::{Adapter, Cursor, ExecResult, Result, Value};
use rusqlite::Connection;

use crate::conversions::{adapter_error, params};
use crate::cursor::SqliteCursor;
use crate::DIALECT;

pub(crate) struct ConnectionAdapter<'c> {
    conn: &'c Connection,
    in_transaction: bool,
}

impl<'c> ConnectionAdapter<'c> {
    pub(crate) fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }
}

impl Adapter for ConnectionAdapter<'_> {
    fn dialect(&self) -> &str {
        DIALECT
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        let fail = |e| adapter_error(sql, args.len(), e);
        let mut stmt = self.conn.prepare_cached(sql).map_err(fail)?;
        let changed = stmt
            .execute(rusqlite::params_from_iter(params(args)))
            .map_err(fail)?;
        Ok(ExecResult {
            rows_affected: changed as u64,
            last_insert_id: Some(self.conn.last_insert_rowid()),
        })
    }

    fn query(
        &self,
        sql: &str,
        args: &[Value],
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        let fail = |e| adapter_error(sql, args.len(), e);
        let mut stmt = self.conn.prepare_cached(sql).map_err(fail)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt
            .query(rusqlite::params_from_iter(params(args)))
            .map_err(fail)?;
        let mut cursor = SqliteCursor {
            columns,
            rows,
            sql,
            arg_count: args.len(),
        };
        visit(&mut cursor)
    }

    fn transaction(&self, body: &mut dyn FnMut(&dyn Adapter) -> Result<()>) -> Result<()> {
        if self.in_transaction {
            return body(self);
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| adapter_error("BEGIN", 0, e))?;
        let scoped = ConnectionAdapter {
            conn: &tx,
            in_transaction: true,
        };
        // Dropping `tx` without commit rolls back.
        body(&scoped)?;
        tx.commit().map_err(|e| adapter_error("COMMIT", 0, e))?;
        tracing::debug!("rowmap-sqlite: transaction committed");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
