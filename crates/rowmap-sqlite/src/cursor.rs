use rowmap_core::{Cursor, Result, Value};
use rusqlite::Rows;

use crate::conversions::{adapter_error, from_value_ref};

/// Cursor over a live rusqlite result set. Lives only as long as the
/// statement it was opened from.
pub(crate) struct SqliteCursor<'s> {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Rows<'s>,
    pub(crate) sql: &'s str,
    pub(crate) arg_count: usize,
}

impl Cursor for SqliteCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        let row = match self.rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(None),
            Err(e) => return Err(adapter_error(self.sql, self.arg_count, e)),
        };

        let mut values = Vec::with_capacity(self.columns.len());
        for i in 0..self.columns.len() {
            let value = row
                .get_ref(i)
                .map_err(|e| adapter_error(self.sql, self.arg_count, e))?;
            values.push(from_value_ref(value));
        }
        Ok(Some(values))
    }
}
