//! Placeholder translation for caller-written SQL.
//!
//! Callers always write `?`. Each `?` becomes the dialect's placeholder for
//! the next argument position; `??` is an escaped literal `?` (e.g. the
//! Postgres jsonb operator). The count must match the argument list exactly.
//!
//! A `?` is not a placeholder inside:
//! - `'...'` strings and `"..."` identifiers,
//! - `-- ...` line comments and `/* ... */` block comments,
//! - `` `...` `` identifiers on MySQL and `[...]` identifiers on SQL Server,
//! - `$$...$$` and `$tag$...$tag$` bodies on Postgres.
//!
//! An unterminated span runs to the end of the statement. Nested block
//! comments are not recognised.

use rowmap_core::{Dialect, Error};

/// Rewrite `sql` for `dialect`. `offset` is the number of placeholders the
/// builder already emitted before this fragment.
pub fn translate(sql: &str, dialect: Dialect, offset: usize, arg_count: usize) -> Result<String, Error> {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut position = offset;
    let mut rest = sql;

    while let Some(c) = rest.chars().next() {
        if let Some(len) = opaque_span(rest, dialect) {
            out.push_str(&rest[..len]);
            rest = &rest[len..];
        } else if rest.starts_with("??") {
            out.push('?');
            rest = &rest[2..];
        } else if c == '?' {
            position += 1;
            out.push_str(&dialect.placeholder(position));
            rest = &rest[1..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    let found = position - offset;
    if found != arg_count {
        return Err(Error::InvalidArgument(format!(
            "statement has {found} placeholders but {arg_count} arguments were given"
        )));
    }

    Ok(out)
}

/// Byte length of the quoted or commented span opening at the head of
/// `sql`, if one does.
fn opaque_span(sql: &str, dialect: Dialect) -> Option<usize> {
    match sql.as_bytes().first()? {
        b'\'' => Some(span_end(sql, 1, "'")),
        b'"' => Some(span_end(sql, 1, "\"")),
        b'-' if sql.starts_with("--") => Some(span_end(sql, 2, "\n")),
        b'/' if sql.starts_with("/*") => Some(span_end(sql, 2, "*/")),
        b'`' if dialect == Dialect::MySql => Some(span_end(sql, 1, "`")),
        b'[' if dialect == Dialect::SqlServer => Some(span_end(sql, 1, "]")),
        b'$' if dialect == Dialect::Postgres => {
            let tag = dollar_tag(sql)?;
            Some(span_end(sql, tag.len(), tag))
        }
        _ => None,
    }
}

/// End of a span whose opener is `open_len` bytes long, just past `close`.
fn span_end(sql: &str, open_len: usize, close: &str) -> usize {
    sql[open_len..]
        .find(close)
        .map_or(sql.len(), |i| open_len + i + close.len())
}

/// `$$` or `$tag$` at the head of `sql`. A tag cannot start with a digit,
/// so `$1` never opens a body.
fn dollar_tag(sql: &str) -> Option<&str> {
    let end = sql[1..].find('$')? + 1;
    let tag = &sql[1..end];
    let valid = tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !tag.starts_with(|c: char| c.is_ascii_digit());
    valid.then(|| &sql[..=end])
}
