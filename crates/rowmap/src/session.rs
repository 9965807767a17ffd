//! `Session` — the per-call orchestration behind every facade operation.
//!
//! Resolve descriptor → build SQL → run through the adapter → scan rows.
//! A session is a borrowed view (adapter + dialect + default key column);
//! `Db` and `Tx` both hand one out.

use rowmap_core::{
    Adapter, AdapterError, AdapterErrorKind, Cursor, Dialect, Error, ExecResult, InsertMethod, Record,
    Value,
};

use crate::builder::{self, QuerySpec};
use crate::metadata::{describe, TableDescriptor};
use crate::scanner;
use crate::table::Table;

#[derive(Clone, Copy)]
pub struct Session<'a> {
    adapter: &'a dyn Adapter,
    dialect: Dialect,
    default_id_column: &'a str,
}

impl<'a> Session<'a> {
    pub fn new(adapter: &'a dyn Adapter, dialect: Dialect, default_id_column: &'a str) -> Self {
        Self {
            adapter,
            dialect,
            default_id_column,
        }
    }

    pub fn adapter(&self) -> &'a dyn Adapter {
        self.adapter
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn default_id_column(&self) -> &'a str {
        self.default_id_column
    }

    fn execute(&self, spec: &QuerySpec) -> Result<ExecResult, Error> {
        tracing::debug!(kind = ?spec.kind, sql = %spec.sql, args = spec.args.len(), "rowmap: execute");
        self.adapter.execute(&spec.sql, &spec.args)
    }

    fn key(&self, table: &Table, desc: &TableDescriptor) -> Result<Vec<usize>, Error> {
        builder::key_indexes(table, desc, self.default_id_column)
    }

    // ─── Writes ─────────────────────────────────────────────────────────────

    pub fn insert<T: Record>(&self, table: &Table, record: &mut T) -> Result<(), Error> {
        let desc = describe::<T>()?;
        let key = self.key(table, &desc)?;
        self.insert_one(table, &desc, &key, record)
    }

    fn insert_one<T: Record>(
        &self,
        table: &Table,
        desc: &TableDescriptor,
        key: &[usize],
        record: &mut T,
    ) -> Result<(), Error> {
        let spec = builder::insert(self.dialect, table, desc, key, &*record)?;

        if spec.read_back.is_empty() {
            self.execute(&spec)?;
            return Ok(());
        }

        match self.dialect.insert_method() {
            InsertMethod::Returning | InsertMethod::Output => {
                tracing::debug!(kind = ?spec.kind, sql = %spec.sql, args = spec.args.len(), "rowmap: insert returning");
                let mut found = false;
                self.adapter.query(&spec.sql, &spec.args, &mut |cursor: &mut dyn Cursor| {
                    found = scanner::scan_one(desc, cursor, record)?;
                    Ok(())
                })?;
                if !found {
                    return Err(AdapterError::new(
                        AdapterErrorKind::Other,
                        spec.sql,
                        spec.args.len(),
                        "insert returned no row",
                    )
                    .into());
                }
                Ok(())
            }
            InsertMethod::LastInsertId => {
                self.check_read_back::<T>(table, desc, key, &spec.read_back)?;
                let result = self.execute(&spec)?;
                let mut pending = spec.read_back;

                if let ([index], Some(id)) = (key, result.last_insert_id) {
                    if let Some(position) = pending.iter().position(|i| i == index) {
                        let mapping = desc.field(*index);
                        record
                            .set_field_value(&mapping.path, Value::Integer(id))
                            .map_err(|source| Error::ScanTypeMismatch {
                                column: mapping.column.clone(),
                                field: mapping.field.clone(),
                                source,
                            })?;
                        pending.remove(position);
                    }
                }

                // Remaining generated columns can only be located through the key.
                if pending.is_empty() {
                    return Ok(());
                }
                let fetch = builder::fetch_columns(self.dialect, table, desc, key, &pending, &*record)?;
                if !self.scan_first(desc, &fetch, record)? {
                    return Err(Error::NotFound {
                        context: format!("inserted row in {} could not be read back", table.name()),
                    });
                }
                Ok(())
            }
        }
    }

    /// Reject, before any SQL runs, an insert whose read-back a last-insert-id
    /// dialect cannot complete. The driver only reports one integer key; every
    /// other pending column is re-read through a fully known key.
    fn check_read_back<T: Record>(
        &self,
        table: &Table,
        desc: &TableDescriptor,
        key: &[usize],
        pending: &[usize],
    ) -> Result<(), Error> {
        if pending.is_empty() {
            return Ok(());
        }
        if key.is_empty() {
            return Err(Error::invalid_mapping(
                desc.type_name(),
                format!("generated columns need a key to be read back on {}", self.dialect),
            ));
        }

        let missing = |index: usize| Error::MissingPrimaryKey {
            table: table.name().to_string(),
            column: desc.field(index).column.clone(),
        };
        let pending_key: Vec<usize> = key.iter().copied().filter(|i| pending.contains(i)).collect();
        match pending_key.as_slice() {
            [] => Ok(()),
            [index] if key.len() == 1 => {
                // Only an integer field can take the driver's row id.
                let mut scratch = T::default();
                scratch
                    .set_field_value(&desc.field(*index).path, Value::Integer(1))
                    .map_err(|_| missing(*index))
            }
            [index, ..] => Err(missing(*index)),
        }
    }

    /// Insert several records. Dialects with `RETURNING`/`OUTPUT` use one
    /// multi-row statement; the others insert record by record.
    pub fn insert_all<T: Record>(&self, table: &Table, records: &mut [T]) -> Result<(), Error> {
        if records.is_empty() {
            return Ok(());
        }
        let desc = describe::<T>()?;
        let key = self.key(table, &desc)?;

        if self.dialect.insert_method() == InsertMethod::LastInsertId {
            for record in records.iter() {
                let spec = builder::insert(self.dialect, table, &desc, &key, record)?;
                self.check_read_back::<T>(table, &desc, &key, &spec.read_back)?;
            }
            for record in records.iter_mut() {
                self.insert_one(table, &desc, &key, record)?;
            }
            return Ok(());
        }

        let spec = builder::insert_many(self.dialect, table, &desc, &key, records)?;
        if spec.read_back.is_empty() {
            self.execute(&spec)?;
            return Ok(());
        }

        tracing::debug!(kind = ?spec.kind, sql = %spec.sql, args = spec.args.len(), "rowmap: insert returning");
        let mut filled = 0;
        self.adapter.query(&spec.sql, &spec.args, &mut |cursor: &mut dyn Cursor| {
            let columns = cursor.columns().to_vec();
            while filled < records.len() {
                let Some(values) = cursor.next_row()? else {
                    break;
                };
                scanner::scan_row(&desc, &columns, values, &mut records[filled])?;
                filled += 1;
            }
            Ok(())
        })?;

        if filled != records.len() {
            return Err(AdapterError::new(
                AdapterErrorKind::Other,
                spec.sql,
                spec.args.len(),
                format!("insert returned {filled} rows for {} records", records.len()),
            )
            .into());
        }
        Ok(())
    }

    pub fn update<T: Record>(&self, table: &Table, record: &T) -> Result<(), Error> {
        self.update_with(table, record, false)
    }

    /// Update only the columns whose value is not NULL.
    pub fn patch<T: Record>(&self, table: &Table, record: &T) -> Result<(), Error> {
        self.update_with(table, record, true)
    }

    fn update_with<T: Record>(&self, table: &Table, record: &T, skip_nulls: bool) -> Result<(), Error> {
        let desc = describe::<T>()?;
        let key = self.key(table, &desc)?;
        let spec = builder::update(self.dialect, table, &desc, &key, record, skip_nulls)?;
        let result = self.execute(&spec)?;
        if result.rows_affected == 0 {
            return Err(Error::NotFound {
                context: format!("no row in {} matches the record's key", table.name()),
            });
        }
        Ok(())
    }

    pub fn delete<T: Record>(&self, table: &Table, record: &T) -> Result<(), Error> {
        let desc = describe::<T>()?;
        let key = self.key(table, &desc)?;
        let spec = builder::delete(self.dialect, table, &desc, &key, record)?;
        self.expect_affected(table, &spec)
    }

    /// Delete by a single key value, using the table's id column (or the
    /// default id column when the table declares none).
    pub fn delete_by_id(&self, table: &Table, id: Value) -> Result<(), Error> {
        self.delete_by_key(table, vec![id])
    }

    /// Delete by key values given in the order of the table's id columns.
    pub fn delete_by_key(&self, table: &Table, values: Vec<Value>) -> Result<(), Error> {
        let columns = match table.id_columns() {
            [] => vec![self.default_id_column.to_string()],
            explicit => explicit.to_vec(),
        };
        let spec = builder::delete_by_columns(self.dialect, table, &columns, values)?;
        self.expect_affected(table, &spec)
    }

    fn expect_affected(&self, table: &Table, spec: &QuerySpec) -> Result<(), Error> {
        let result = self.execute(spec)?;
        if result.rows_affected == 0 {
            return Err(Error::NotFound {
                context: format!("no row in {} matches the key", table.name()),
            });
        }
        Ok(())
    }

    /// Run a raw statement; returns the affected row count.
    pub fn exec(&self, sql: &str, args: &[Value]) -> Result<u64, Error> {
        let sql = builder::translate(sql, self.dialect, 0, args.len())?;
        tracing::debug!(sql = %sql, args = args.len(), "rowmap: exec");
        Ok(self.adapter.execute(&sql, args)?.rows_affected)
    }

    // ─── Reads ──────────────────────────────────────────────────────────────

    pub fn query<T: Record>(&self, table: &Table, filter: &str, args: &[Value]) -> Result<Vec<T>, Error> {
        let desc = describe::<T>()?;
        let spec = builder::select(self.dialect, table, &desc, filter, args)?;
        self.scan_all(&desc, &spec)
    }

    pub fn query_sql<T: Record>(&self, sql: &str, args: &[Value]) -> Result<Vec<T>, Error> {
        let desc = describe::<T>()?;
        let spec = builder::select_sql(self.dialect, &desc, sql, args)?;
        self.scan_all(&desc, &spec)
    }

    /// First matching row. Extra rows are ignored; zero rows is `NotFound`.
    pub fn query_one<T: Record>(&self, table: &Table, filter: &str, args: &[Value]) -> Result<T, Error> {
        let desc = describe::<T>()?;
        let spec = builder::select(self.dialect, table, &desc, filter, args)?;
        self.first_or_not_found(&desc, &spec)
    }

    pub fn query_one_sql<T: Record>(&self, sql: &str, args: &[Value]) -> Result<T, Error> {
        let desc = describe::<T>()?;
        let spec = builder::select_sql(self.dialect, &desc, sql, args)?;
        self.first_or_not_found(&desc, &spec)
    }

    fn scan_all<T: Record>(&self, desc: &TableDescriptor, spec: &QuerySpec) -> Result<Vec<T>, Error> {
        tracing::debug!(kind = ?spec.kind, sql = %spec.sql, args = spec.args.len(), "rowmap: query");
        let mut records = Vec::new();
        self.adapter.query(&spec.sql, &spec.args, &mut |cursor: &mut dyn Cursor| {
            scanner::scan_all(desc, cursor, &mut records).map(|_| ())
        })?;
        Ok(records)
    }

    fn scan_first<T: Record>(&self, desc: &TableDescriptor, spec: &QuerySpec, target: &mut T) -> Result<bool, Error> {
        tracing::debug!(kind = ?spec.kind, sql = %spec.sql, args = spec.args.len(), "rowmap: query one");
        let mut found = false;
        self.adapter.query(&spec.sql, &spec.args, &mut |cursor: &mut dyn Cursor| {
            found = scanner::scan_one(desc, cursor, target)?;
            Ok(())
        })?;
        Ok(found)
    }

    fn first_or_not_found<T: Record>(&self, desc: &TableDescriptor, spec: &QuerySpec) -> Result<T, Error> {
        let mut record = T::default();
        if !self.scan_first(desc, spec, &mut record)? {
            return Err(Error::NotFound {
                context: match &spec.filter {
                    Some(filter) if !spec.table.is_empty() => format!("{} where {filter}", spec.table),
                    Some(filter) => filter.clone(),
                    None => spec.table.clone(),
                },
            });
        }
        Ok(record)
    }
}
