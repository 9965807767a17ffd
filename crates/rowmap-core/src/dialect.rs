//! SQL dialects: placeholder syntax, identifier quoting and the strategy
//! used to read generated values back after an insert.

use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite3,
    SqlServer,
}

/// How generated column values come back from an `INSERT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMethod {
    /// `INSERT ... RETURNING cols`
    Returning,
    /// `INSERT ... OUTPUT INSERTED.col VALUES ...`
    Output,
    /// Driver-reported last insert id, plus a follow-up select if needed.
    LastInsertId,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [Self::Postgres, Self::MySql, Self::Sqlite3, Self::SqlServer];

    pub fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite3 => "sqlite3",
            Self::SqlServer => "sqlserver",
        }
    }

    /// Placeholder for the 1-based argument position `n`.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Self::Postgres => format!("${n}"),
            Self::MySql | Self::Sqlite3 => "?".to_string(),
            Self::SqlServer => format!("@p{n}"),
        }
    }

    pub fn insert_method(self) -> InsertMethod {
        match self {
            Self::Postgres => InsertMethod::Returning,
            Self::SqlServer => InsertMethod::Output,
            Self::MySql | Self::Sqlite3 => InsertMethod::LastInsertId,
        }
    }

    /// Quote a column identifier, doubling any embedded quote character.
    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            Self::Postgres | Self::Sqlite3 => format!("\"{}\"", ident.replace('"', "\"\"")),
            Self::MySql => format!("`{}`", ident.replace('`', "``")),
            Self::SqlServer => format!("[{}]", ident.replace(']', "]]")),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgx" => Ok(Self::Postgres),
            "mysql" => Ok(Self::MySql),
            "sqlite3" | "sqlite" => Ok(Self::Sqlite3),
            "sqlserver" | "mssql" => Ok(Self::SqlServer),
            other => Err(Error::Config(format!("unsupported dialect: {other:?}"))),
        }
    }
}
