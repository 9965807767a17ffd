//! Dialect-aware SQL generation.
//!
//! Every builder returns a `QuerySpec`: the final SQL text plus the
//! ordered arguments to bind. Nothing here touches a connection.

mod placeholders;
mod statements;

use rowmap_core::{Dialect, Error, InsertMethod, Value};

use crate::metadata::TableDescriptor;
use crate::table::Table;

pub use placeholders::translate;
pub use statements::{
    delete, delete_by_columns, fetch_columns, insert, insert_many, select, select_sql, update,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Insert,
    Update,
    Delete,
    Select,
}

/// A statement ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub kind: QueryKind,
    pub table: String,
    /// Columns written (insert/update) or read (select).
    pub columns: Vec<String>,
    /// Caller-supplied condition, before placeholder translation.
    pub filter: Option<String>,
    pub sql: String,
    pub args: Vec<Value>,
    /// Insert only: mapping indexes whose values the database assigns.
    pub read_back: Vec<usize>,
    /// Insert only: how `read_back` values are returned.
    pub method: Option<InsertMethod>,
}

impl QuerySpec {
    fn new(kind: QueryKind, table: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            columns: Vec::new(),
            filter: None,
            sql: String::new(),
            args: Vec::new(),
            read_back: Vec::new(),
            method: None,
        }
    }
}

/// Resolve the key mapping indexes for `table`.
///
/// Explicit table id columns win, then `pk` tags, then `default_id_column`
/// if the record maps it. An empty result means the record has no key.
pub fn key_indexes(
    table: &Table,
    desc: &TableDescriptor,
    default_id_column: &str,
) -> Result<Vec<usize>, Error> {
    if !table.id_columns().is_empty() {
        return table
            .id_columns()
            .iter()
            .map(|column| {
                desc.index_of(column).ok_or_else(|| {
                    Error::invalid_mapping(
                        desc.type_name(),
                        format!("id column {column:?} of table {} is not mapped", table.name()),
                    )
                })
            })
            .collect();
    }

    if !desc.primary_key().is_empty() {
        return Ok(desc.primary_key().to_vec());
    }

    Ok(desc.index_of(default_id_column).into_iter().collect())
}

fn column_list(dialect: Dialect, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholder_list(dialect: Dialect, first: usize, count: usize) -> String {
    (first..first + count)
        .map(|n| dialect.placeholder(n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `a = $1 AND b = $2`, numbering from `first`.
fn equality_list(dialect: Dialect, columns: &[String], first: usize, separator: &str) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", dialect.quote_ident(c), dialect.placeholder(first + i)))
        .collect::<Vec<_>>()
        .join(separator)
}
