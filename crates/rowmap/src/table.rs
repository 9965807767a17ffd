//! Table handles passed to every facade call.

/// A target table.
///
/// The primary key normally comes from the record's `pk` tags. Explicit id
/// columns override the tags, e.g. when one record type is stored in
/// several tables keyed differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    id_columns: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_columns: Vec::new(),
        }
    }

    pub fn with_id_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_columns(&self) -> &[String] {
        &self.id_columns
    }
}
