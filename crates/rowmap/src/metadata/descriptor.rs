//! `TableDescriptor` — the column ↔ field mapping for one record type.

use rowmap_core::{CoerceError, Error, Record, Value};
use rustc_hash::FxHashMap;

use super::tags::parse_tag;

/// One mapped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub column: String,
    /// Field name; `outer.inner` for columns of an embedded record.
    pub field: String,
    /// Accessor path handed to `Record::field_value` / `set_field_value`.
    pub path: Vec<usize>,
    pub primary_key: bool,
    pub generated: bool,
}

/// The field that absorbs unmapped result columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainderField {
    pub field: String,
    pub path: Vec<usize>,
}

/// Immutable mapping built once per record type.
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    type_name: &'static str,
    fields: Vec<FieldMapping>,
    primary_key: Vec<usize>,
    remainder: Option<RemainderField>,
    by_column: FxHashMap<String, usize>,
    by_lowercase: FxHashMap<String, usize>,
}

/// Build failure; cloneable so the cache can hand it to every waiter.
#[derive(Debug, Clone)]
pub(crate) struct MappingFailure {
    type_name: &'static str,
    reason: String,
}

impl From<MappingFailure> for Error {
    fn from(failure: MappingFailure) -> Self {
        Error::invalid_mapping(failure.type_name, failure.reason)
    }
}

impl TableDescriptor {
    /// Parse `T`'s field tags.
    pub(crate) fn build<T: Record>() -> Result<Self, MappingFailure> {
        let type_name = std::any::type_name::<T>();
        let fail = |reason: String| MappingFailure { type_name, reason };

        let mut descriptor = Self {
            type_name,
            fields: Vec::new(),
            primary_key: Vec::new(),
            remainder: None,
            by_column: FxHashMap::default(),
            by_lowercase: FxHashMap::default(),
        };

        for (index, tag) in T::field_tags().into_iter().enumerate() {
            let parsed =
                parse_tag(tag.tag).map_err(|reason| fail(format!("field {}: {reason}", tag.field)))?;

            if parsed.embed {
                let inner_tags = tag.embedded.ok_or_else(|| {
                    fail(format!("field {} is tagged embed but is not a record", tag.field))
                })?;
                for (inner_index, inner) in inner_tags().into_iter().enumerate() {
                    let field = format!("{}.{}", tag.field, inner.field);
                    let inner_parsed =
                        parse_tag(inner.tag).map_err(|reason| fail(format!("field {field}: {reason}")))?;
                    if inner_parsed.embed || inner.embedded.is_some() {
                        return Err(fail(format!(
                            "field {field}: embedding is limited to one level"
                        )));
                    }
                    if inner_parsed.remainder {
                        return Err(fail(format!(
                            "field {field}: a remainder field must be declared on the outer record"
                        )));
                    }
                    descriptor
                        .push(FieldMapping {
                            column: inner_parsed.column,
                            field,
                            path: vec![index, inner_index],
                            primary_key: inner_parsed.primary_key,
                            generated: inner_parsed.generated,
                        })
                        .map_err(fail)?;
                }
                continue;
            }

            if tag.embedded.is_some() {
                return Err(fail(format!(
                    "field {} carries embedded tags but is not tagged embed",
                    tag.field
                )));
            }

            if parsed.remainder {
                if descriptor.remainder.is_some() {
                    return Err(fail("more than one remainder field".to_string()));
                }
                descriptor.remainder = Some(RemainderField {
                    field: tag.field.to_string(),
                    path: vec![index],
                });
                continue;
            }

            descriptor
                .push(FieldMapping {
                    column: parsed.column,
                    field: tag.field.to_string(),
                    path: vec![index],
                    primary_key: parsed.primary_key,
                    generated: parsed.generated,
                })
                .map_err(fail)?;
        }

        if descriptor.fields.is_empty() {
            return Err(fail("no mapped fields".to_string()));
        }

        Ok(descriptor)
    }

    fn push(&mut self, mapping: FieldMapping) -> Result<(), String> {
        let index = self.fields.len();
        if self.by_column.insert(mapping.column.clone(), index).is_some() {
            return Err(format!("column {:?} is mapped more than once", mapping.column));
        }
        self.by_lowercase
            .entry(mapping.column.to_ascii_lowercase())
            .or_insert(index);
        if mapping.primary_key {
            self.primary_key.push(index);
        }
        self.fields.push(mapping);
        Ok(())
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Mappings in declaration order.
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> &FieldMapping {
        &self.fields[index]
    }

    /// Indexes of tag-declared primary-key mappings.
    pub fn primary_key(&self) -> &[usize] {
        &self.primary_key
    }

    pub fn remainder(&self) -> Option<&RemainderField> {
        self.remainder.as_ref()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.column.as_str())
    }

    /// Mapping index for a result column: exact match first, then ASCII
    /// case-insensitive.
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.by_column
            .get(column)
            .or_else(|| self.by_lowercase.get(&column.to_ascii_lowercase()))
            .copied()
    }

    pub fn lookup(&self, column: &str) -> Option<&FieldMapping> {
        self.index_of(column).map(|i| &self.fields[i])
    }

    /// Read the value of mapping `index` from `record`.
    pub fn value_of<T: Record>(&self, record: &T, index: usize) -> Result<Value, Error> {
        let mapping = &self.fields[index];
        record
            .field_value(&mapping.path)
            .map_err(|e: CoerceError| {
                Error::InvalidArgument(format!("field {}: {e}", mapping.field))
            })
    }
}
