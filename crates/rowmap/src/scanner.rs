//! Result rows → records.
//!
//! Columns are matched to mappings by name. Unmatched columns go into the
//! record's remainder field as a JSON object when it declares one, and are
//! ignored otherwise.

use rowmap_core::{Cursor, Error, Record, Value};

use crate::metadata::TableDescriptor;

/// Copy one row into `target`.
pub fn scan_row<T: Record>(
    desc: &TableDescriptor,
    columns: &[String],
    values: Vec<Value>,
    target: &mut T,
) -> Result<(), Error> {
    if values.len() != columns.len() {
        return Err(Error::InvalidArgument(format!(
            "row has {} values for {} columns",
            values.len(),
            columns.len()
        )));
    }

    let mut unmatched = serde_json::Map::new();
    for (column, value) in columns.iter().zip(values) {
        match desc.lookup(column) {
            Some(mapping) => {
                target
                    .set_field_value(&mapping.path, value)
                    .map_err(|source| Error::ScanTypeMismatch {
                        column: column.clone(),
                        field: mapping.field.clone(),
                        source,
                    })?;
            }
            None if desc.remainder().is_some() => {
                unmatched.insert(column.clone(), value.to_json());
            }
            None => {}
        }
    }

    if let Some(remainder) = desc.remainder() {
        if !unmatched.is_empty() {
            let text = serde_json::Value::Object(unmatched).to_string();
            target
                .set_field_value(&remainder.path, Value::Text(text))
                .map_err(|source| Error::ScanTypeMismatch {
                    column: "<remainder>".to_string(),
                    field: remainder.field.clone(),
                    source,
                })?;
        }
    }

    Ok(())
}

/// Read at most one row into `target`. Returns false if the cursor was empty.
pub fn scan_one<T: Record>(desc: &TableDescriptor, cursor: &mut dyn Cursor, target: &mut T) -> Result<bool, Error> {
    let columns = cursor.columns().to_vec();
    match cursor.next_row()? {
        Some(values) => {
            scan_row(desc, &columns, values, target)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Append one record per remaining row, in cursor order.
///
/// Stops at the first error; `dest` is then left holding whatever was
/// appended before it and should be discarded by the caller.
pub fn scan_all<T: Record>(desc: &TableDescriptor, cursor: &mut dyn Cursor, dest: &mut Vec<T>) -> Result<usize, Error> {
    let columns = cursor.columns().to_vec();
    let mut count = 0;
    while let Some(values) = cursor.next_row()? {
        let mut record = T::default();
        scan_row(desc, &columns, values, &mut record)?;
        dest.push(record);
        count += 1;
    }
    Ok(count)
}
