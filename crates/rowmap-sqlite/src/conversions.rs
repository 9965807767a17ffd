//! Value conversions and error classification at the rusqlite boundary.

use rowmap_core::{AdapterError, AdapterErrorKind, Error, Value};
use rusqlite::ffi::ErrorCode;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;

/// Borrowed argument bound as a statement parameter.
pub(crate) struct SqlArg<'a>(pub &'a Value);

impl ToSql for SqlArg<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self.0 {
            Value::Null => ValueRef::Null,
            Value::Integer(i) => ValueRef::Integer(*i),
            Value::Real(f) => ValueRef::Real(*f),
            Value::Text(s) => ValueRef::Text(s.as_bytes()),
            Value::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

pub(crate) fn params(args: &[Value]) -> impl Iterator<Item = SqlArg<'_>> {
    args.iter().map(SqlArg)
}

/// Column value read from a row. Text that is not valid UTF-8 is returned
/// as a blob rather than failing the row.
pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => Value::Blob(bytes.to_vec()),
        },
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

pub(crate) fn classify(err: &rusqlite::Error) -> AdapterErrorKind {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => AdapterErrorKind::Busy,
            ErrorCode::OperationInterrupted => AdapterErrorKind::Interrupted,
            ErrorCode::ConstraintViolation => AdapterErrorKind::Constraint,
            _ => AdapterErrorKind::Other,
        },
        _ => AdapterErrorKind::Other,
    }
}

/// Wrap a driver error with the statement it came from.
pub(crate) fn adapter_error(sql: &str, arg_count: usize, err: rusqlite::Error) -> Error {
    let kind = classify(&err);
    AdapterError::wrap(kind, sql, arg_count, err).into()
}

/// Close `conn`. On failure the driver hands the connection back, and so
/// does this, with the error mapped like any statement error.
pub(crate) fn close_connection(
    conn: rusqlite::Connection,
) -> std::result::Result<(), (rusqlite::Connection, Error)> {
    conn.close().map_err(|(conn, e)| (conn, adapter_error("", 0, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_and_constraint_failures_are_classified() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert_eq!(classify(&busy), AdapterErrorKind::Busy);

        let constraint = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("UNIQUE constraint failed: users.name".to_string()),
        );
        assert_eq!(classify(&constraint), AdapterErrorKind::Constraint);

        assert_eq!(classify(&rusqlite::Error::QueryReturnedNoRows), AdapterErrorKind::Other);
    }

    #[test]
    fn driver_failures_wrap_as_adapter_errors() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        match adapter_error("", 0, busy) {
            Error::Adapter(e) => {
                assert_eq!(e.kind, AdapterErrorKind::Busy);
                assert_eq!(e.arg_count, 0);
            }
            other => panic!("unexpected error: {other}"),
        }

        let conn = rusqlite::Connection::open_in_memory().unwrap();
        assert!(close_connection(conn).is_ok());
    }

    #[test]
    fn invalid_utf8_text_reads_as_blob() {
        assert_eq!(from_value_ref(ValueRef::Text(&[0xff, 0xfe])), Value::Blob(vec![0xff, 0xfe]));
        assert_eq!(from_value_ref(ValueRef::Text(b"ok")), Value::from("ok"));
    }
}
