//! The contract between user record types and the mapper.
//!
//! A record lists its mapped fields as tags in declaration order and
//! exposes index-addressed accessors. `#[derive(Record)]` generates all
//! three methods; hand-written impls are fine too.
//!
//! Tag format: `"<column>[,<modifier>...]"`. Modifiers:
//!
//! - `pk` / `primary_key`: part of the primary key.
//! - `generated`: assigned by the database; never inserted or updated.
//! - `remainder`: captures unmapped result columns as JSON text. The
//!   column part is only a label.
//! - `embed`: the field is itself a `Record` whose columns are mapped as
//!   if they were declared here (one level only).

use crate::errors::CoerceError;
use crate::value::Value;

/// One mapped field as declared on the record type.
#[derive(Debug, Clone, Copy)]
pub struct FieldTag {
    /// Rust field name.
    pub field: &'static str,
    /// Raw tag text, parsed once by the metadata cache.
    pub tag: &'static str,
    /// Tags of the embedded record, for `embed` fields.
    pub embedded: Option<fn() -> Vec<FieldTag>>,
}

impl FieldTag {
    pub const fn new(field: &'static str, tag: &'static str) -> Self {
        Self {
            field,
            tag,
            embedded: None,
        }
    }

    pub const fn embed(field: &'static str, tag: &'static str, tags: fn() -> Vec<FieldTag>) -> Self {
        Self {
            field,
            tag,
            embedded: Some(tags),
        }
    }
}

/// A type that maps onto a table row.
///
/// Paths index into `field_tags()`: `[i]` is the i-th tagged field,
/// `[i, j]` is the j-th tagged field of the record embedded at `i`.
pub trait Record: Default + 'static {
    fn field_tags() -> Vec<FieldTag>;

    fn field_value(&self, path: &[usize]) -> Result<Value, CoerceError>;

    fn set_field_value(&mut self, path: &[usize], value: Value) -> Result<(), CoerceError>;
}
