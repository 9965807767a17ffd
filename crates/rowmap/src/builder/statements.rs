//! INSERT / UPDATE / DELETE / SELECT generation.

use rowmap_core::{Dialect, Error, InsertMethod, Record, Value};

use super::{column_list, equality_list, placeholder_list, translate, QueryKind, QuerySpec};
use crate::metadata::TableDescriptor;
use crate::table::Table;

/// Columns an insert writes and the ones it must read back.
struct InsertPlan {
    columns: Vec<usize>,
    values: Vec<Value>,
    read_back: Vec<usize>,
}

// Generated columns are always read back. Key columns are read back when
// they still hold a zero value, i.e. the database is expected to assign them.
fn plan_insert<T: Record>(desc: &TableDescriptor, key: &[usize], record: &T) -> Result<InsertPlan, Error> {
    let mut plan = InsertPlan {
        columns: Vec::new(),
        values: Vec::new(),
        read_back: Vec::new(),
    };

    for (index, mapping) in desc.fields().iter().enumerate() {
        if mapping.generated {
            plan.read_back.push(index);
            continue;
        }
        let value = desc.value_of(record, index)?;
        if key.contains(&index) && value.is_zero() {
            plan.read_back.push(index);
            continue;
        }
        plan.columns.push(index);
        plan.values.push(value);
    }

    Ok(plan)
}

fn names(desc: &TableDescriptor, indexes: &[usize]) -> Vec<String> {
    indexes.iter().map(|&i| desc.field(i).column.clone()).collect()
}

fn insert_sql(dialect: Dialect, table: &Table, columns: &[String], rows: &[String], read_back: &[String]) -> String {
    let head = format!("INSERT INTO {} ({})", table.name(), column_list(dialect, columns));
    let values = format!("VALUES {}", rows.join(", "));

    if read_back.is_empty() {
        return format!("{head} {values}");
    }

    match dialect.insert_method() {
        InsertMethod::Returning => {
            format!("{head} {values} RETURNING {}", column_list(dialect, read_back))
        }
        InsertMethod::Output => {
            let inserted = read_back
                .iter()
                .map(|c| format!("INSERTED.{}", dialect.quote_ident(c)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{head} OUTPUT {inserted} {values}")
        }
        InsertMethod::LastInsertId => format!("{head} {values}"),
    }
}

/// `INSERT` for one record.
pub fn insert<T: Record>(
    dialect: Dialect,
    table: &Table,
    desc: &TableDescriptor,
    key: &[usize],
    record: &T,
) -> Result<QuerySpec, Error> {
    let plan = plan_insert(desc, key, record)?;
    if plan.columns.is_empty() {
        return Err(Error::NoColumns {
            table: table.name().to_string(),
        });
    }

    let columns = names(desc, &plan.columns);
    let row = format!("({})", placeholder_list(dialect, 1, columns.len()));
    let read_back = names(desc, &plan.read_back);

    let mut spec = QuerySpec::new(QueryKind::Insert, table.name());
    spec.sql = insert_sql(dialect, table, &columns, &[row], &read_back);
    spec.columns = columns;
    spec.args = plan.values;
    spec.read_back = plan.read_back;
    spec.method = Some(dialect.insert_method());
    Ok(spec)
}

/// Multi-row `INSERT`. Every record must agree on which key columns are
/// already assigned, so that all rows share one column list.
pub fn insert_many<T: Record>(
    dialect: Dialect,
    table: &Table,
    desc: &TableDescriptor,
    key: &[usize],
    records: &[T],
) -> Result<QuerySpec, Error> {
    let mut plans = records
        .iter()
        .map(|record| plan_insert(desc, key, record))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = plans.first() else {
        return Err(Error::InvalidArgument("no records to insert".to_string()));
    };
    if first.columns.is_empty() {
        return Err(Error::NoColumns {
            table: table.name().to_string(),
        });
    }
    if plans.iter().any(|p| p.columns != first.columns) {
        return Err(Error::InvalidArgument(
            "records disagree on which key columns are assigned".to_string(),
        ));
    }

    let columns = names(desc, &first.columns);
    let read_back_indexes = first.read_back.clone();
    let read_back = names(desc, &read_back_indexes);
    let width = columns.len();
    let rows: Vec<String> = (0..plans.len())
        .map(|row| format!("({})", placeholder_list(dialect, 1 + row * width, width)))
        .collect();

    let mut spec = QuerySpec::new(QueryKind::Insert, table.name());
    spec.sql = insert_sql(dialect, table, &columns, &rows, &read_back);
    spec.columns = columns;
    spec.args = plans.iter_mut().flat_map(|p| std::mem::take(&mut p.values)).collect();
    spec.read_back = read_back_indexes;
    spec.method = Some(dialect.insert_method());
    Ok(spec)
}

/// Key columns and values; fails before any SQL if a key value is unset.
fn key_values<T: Record>(
    table: &Table,
    desc: &TableDescriptor,
    key: &[usize],
    record: &T,
) -> Result<(Vec<String>, Vec<Value>), Error> {
    if key.is_empty() {
        return Err(Error::invalid_mapping(
            desc.type_name(),
            format!("no primary key declared for table {}", table.name()),
        ));
    }

    let mut columns = Vec::with_capacity(key.len());
    let mut values = Vec::with_capacity(key.len());
    for &index in key {
        let column = desc.field(index).column.clone();
        let value = desc.value_of(record, index)?;
        if value.is_zero() {
            return Err(Error::MissingPrimaryKey {
                table: table.name().to_string(),
                column,
            });
        }
        columns.push(column);
        values.push(value);
    }
    Ok((columns, values))
}

/// `UPDATE ... SET ... WHERE <key>`. With `skip_nulls`, columns whose
/// current value is NULL are left untouched (patch semantics).
pub fn update<T: Record>(
    dialect: Dialect,
    table: &Table,
    desc: &TableDescriptor,
    key: &[usize],
    record: &T,
    skip_nulls: bool,
) -> Result<QuerySpec, Error> {
    let (key_columns, key_args) = key_values(table, desc, key, record)?;

    let mut columns = Vec::new();
    let mut args = Vec::new();
    for (index, mapping) in desc.fields().iter().enumerate() {
        if mapping.generated || key.contains(&index) {
            continue;
        }
        let value = desc.value_of(record, index)?;
        if skip_nulls && value.is_null() {
            continue;
        }
        columns.push(mapping.column.clone());
        args.push(value);
    }
    if columns.is_empty() {
        return Err(Error::NoColumns {
            table: table.name().to_string(),
        });
    }

    let mut spec = QuerySpec::new(QueryKind::Update, table.name());
    spec.sql = format!(
        "UPDATE {} SET {} WHERE {}",
        table.name(),
        equality_list(dialect, &columns, 1, ", "),
        equality_list(dialect, &key_columns, columns.len() + 1, " AND "),
    );
    spec.columns = columns;
    spec.args = args;
    spec.args.extend(key_args);
    Ok(spec)
}

/// `DELETE ... WHERE <key>` for a record.
pub fn delete<T: Record>(
    dialect: Dialect,
    table: &Table,
    desc: &TableDescriptor,
    key: &[usize],
    record: &T,
) -> Result<QuerySpec, Error> {
    let (key_columns, key_args) = key_values(table, desc, key, record)?;
    delete_by_columns(dialect, table, &key_columns, key_args)
}

/// `DELETE ... WHERE <columns> = <values>` without a record.
pub fn delete_by_columns(
    dialect: Dialect,
    table: &Table,
    columns: &[String],
    values: Vec<Value>,
) -> Result<QuerySpec, Error> {
    if columns.is_empty() || columns.len() != values.len() {
        return Err(Error::InvalidArgument(format!(
            "{} key values given for {} key columns of {}",
            values.len(),
            columns.len(),
            table.name()
        )));
    }
    if let Some(position) = values.iter().position(Value::is_zero) {
        return Err(Error::MissingPrimaryKey {
            table: table.name().to_string(),
            column: columns[position].clone(),
        });
    }

    let mut spec = QuerySpec::new(QueryKind::Delete, table.name());
    spec.sql = format!(
        "DELETE FROM {} WHERE {}",
        table.name(),
        equality_list(dialect, columns, 1, " AND ")
    );
    spec.columns = columns.to_vec();
    spec.args = values;
    Ok(spec)
}

/// `SELECT <mapped columns> FROM <table> [WHERE <filter>]`.
pub fn select(
    dialect: Dialect,
    table: &Table,
    desc: &TableDescriptor,
    filter: &str,
    args: &[Value],
) -> Result<QuerySpec, Error> {
    let columns: Vec<String> = desc.columns().map(str::to_string).collect();
    let mut sql = format!("SELECT {} FROM {}", column_list(dialect, &columns), table.name());

    let filter = filter.trim();
    if filter.is_empty() {
        translate("", dialect, 0, args.len())?;
    } else {
        sql.push_str(" WHERE ");
        sql.push_str(&translate(filter, dialect, 0, args.len())?);
    }

    let mut spec = QuerySpec::new(QueryKind::Select, table.name());
    spec.sql = sql;
    spec.columns = columns;
    spec.filter = (!filter.is_empty()).then(|| filter.to_string());
    spec.args = args.to_vec();
    Ok(spec)
}

/// A caller-written query. A statement starting with `FROM` gets the
/// record's column list prefixed; anything else runs as written.
pub fn select_sql(dialect: Dialect, desc: &TableDescriptor, sql: &str, args: &[Value]) -> Result<QuerySpec, Error> {
    let trimmed = sql.trim_start();
    let starts_with_from = trimmed
        .get(..4)
        .is_some_and(|head| head.eq_ignore_ascii_case("from"))
        && trimmed[4..].starts_with(char::is_whitespace);

    let columns: Vec<String> = desc.columns().map(str::to_string).collect();
    let translated = translate(trimmed, dialect, 0, args.len())?;

    let mut spec = QuerySpec::new(QueryKind::Select, "");
    spec.sql = if starts_with_from {
        format!("SELECT {} {translated}", column_list(dialect, &columns))
    } else {
        translated
    };
    spec.columns = columns;
    spec.filter = Some(sql.to_string());
    spec.args = args.to_vec();
    Ok(spec)
}

/// Follow-up read of database-assigned columns after an insert on a
/// dialect without `RETURNING`/`OUTPUT`.
pub fn fetch_columns<T: Record>(
    dialect: Dialect,
    table: &Table,
    desc: &TableDescriptor,
    key: &[usize],
    indexes: &[usize],
    record: &T,
) -> Result<QuerySpec, Error> {
    let (key_columns, key_args) = key_values(table, desc, key, record)?;
    let columns = names(desc, indexes);

    let mut spec = QuerySpec::new(QueryKind::Select, table.name());
    spec.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        column_list(dialect, &columns),
        table.name(),
        equality_list(dialect, &key_columns, 1, " AND ")
    );
    spec.columns = columns;
    spec.args = key_args;
    Ok(spec)
}
