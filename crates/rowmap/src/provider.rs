//! `Provider` — the public operations, shared by `Db` and `Tx`.

use rowmap_core::{Adapter, Error, Record, Value};

use crate::db::Tx;
use crate::session::Session;
use crate::table::Table;

/// Insert / update / delete / query operations over one adapter.
///
/// Implementors only supply `session()`; every operation resolves the
/// record's descriptor, builds the statement for the active dialect, runs
/// it and, for reads, scans the rows back.
pub trait Provider {
    fn session(&self) -> Session<'_>;

    /// Insert `record`. Generated and unassigned key columns are skipped
    /// and written back into `record` from the database.
    fn insert<T: Record>(&self, table: &Table, record: &mut T) -> Result<(), Error> {
        self.session().insert(table, record)
    }

    /// Insert every record, filling generated columns in order.
    fn insert_all<T: Record>(&self, table: &Table, records: &mut [T]) -> Result<(), Error> {
        self.session().insert_all(table, records)
    }

    /// Overwrite all non-key columns. Fails with `MissingPrimaryKey` before
    /// any SQL if the key is unset, `NotFound` if no row matched.
    fn update<T: Record>(&self, table: &Table, record: &T) -> Result<(), Error> {
        self.session().update(table, record)
    }

    /// Like `update`, but columns whose value is NULL keep their stored value.
    fn patch<T: Record>(&self, table: &Table, record: &T) -> Result<(), Error> {
        self.session().patch(table, record)
    }

    fn delete<T: Record>(&self, table: &Table, record: &T) -> Result<(), Error> {
        self.session().delete(table, record)
    }

    fn delete_by_id(&self, table: &Table, id: impl Into<Value>) -> Result<(), Error> {
        self.session().delete_by_id(table, id.into())
    }

    /// Composite-key delete; `values` follow the table's id columns.
    fn delete_by_key(&self, table: &Table, values: &[Value]) -> Result<(), Error> {
        self.session().delete_by_key(table, values.to_vec())
    }

    /// Run a raw statement written with `?` placeholders.
    fn exec(&self, sql: &str, args: &[Value]) -> Result<u64, Error> {
        self.session().exec(sql, args)
    }

    /// `SELECT <record columns> FROM table [WHERE filter]`.
    fn query<T: Record>(&self, table: &Table, filter: &str, args: &[Value]) -> Result<Vec<T>, Error> {
        self.session().query(table, filter, args)
    }

    /// Full statement; one starting with `FROM` gets the column list prefixed.
    fn query_sql<T: Record>(&self, sql: &str, args: &[Value]) -> Result<Vec<T>, Error> {
        self.session().query_sql(sql, args)
    }

    /// First matching row, or `NotFound`.
    ///
    /// Lenient on purpose: when several rows match, the first one returned
    /// by the database wins and the rest are ignored.
    fn query_one<T: Record>(&self, table: &Table, filter: &str, args: &[Value]) -> Result<T, Error> {
        self.session().query_one(table, filter, args)
    }

    fn query_one_sql<T: Record>(&self, sql: &str, args: &[Value]) -> Result<T, Error> {
        self.session().query_one_sql(sql, args)
    }

    /// Run `body` in a transaction: committed on `Ok`, rolled back on `Err`.
    /// Calling this on a `Tx` runs `body` inside the outer transaction.
    ///
    /// Inside `body`, issue every statement through the `Tx` it receives.
    /// The adapter holds its connection for the whole body, so calling the
    /// owning `Db` from there deadlocks on adapters that serialize on one
    /// connection (both SQLite adapters do for writes).
    fn transaction<R, F>(&self, body: F) -> Result<R, Error>
    where
        F: FnOnce(&Tx<'_>) -> Result<R, Error>,
    {
        let session = self.session();
        let mut body = Some(body);
        let mut output = None;

        session.adapter().transaction(&mut |conn: &dyn Adapter| {
            let body = body
                .take()
                .ok_or_else(|| Error::InvalidArgument("transaction body ran twice".to_string()))?;
            let tx = Tx::new(conn, session.dialect(), session.default_id_column());
            output = Some(body(&tx)?);
            Ok(())
        })?;

        output.ok_or_else(|| Error::InvalidArgument("transaction body did not run".to_string()))
    }
}
