use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValue;

/// The columns of one result set: names in projection order plus a
/// name-to-index map, built once and shared by every row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColumnSet {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    /// Column names in projection order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A row from a normalized query result.
///
/// Holds its values and a handle to the result set's shared [`ColumnSet`];
/// column names have already been lower-cased by normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDbRow {
    columns: Arc<ColumnSet>,
    values: Vec<RowValue>,
}

impl CustomDbRow {
    #[must_use]
    pub fn new(columns: Arc<ColumnSet>, values: Vec<RowValue>) -> Self {
        Self { columns, values }
    }

    /// The column set shared with every other row of the same result.
    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValue> {
        self.columns
            .index_of(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValue> {
        self.values.get(index)
    }

    /// Row values in projection order.
    #[must_use]
    pub fn values(&self) -> &[RowValue] {
        &self.values
    }
}
