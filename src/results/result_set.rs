use std::sync::Arc;

use super::row::{ColumnSet, CustomDbRow};
use crate::types::RowValue;

/// A materialized query result.
///
/// Rows hold their values only; names and the name-to-index map live in one
/// [`ColumnSet`] built when the column names are set and shared by every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    columns: Option<Arc<ColumnSet>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            columns: None,
        }
    }

    /// Set the column names for this result set, building the shared lookup
    /// index once.
    pub fn set_column_names(&mut self, names: Vec<String>) {
        self.columns = Some(Arc::new(ColumnSet::new(names)));
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn get_column_names(&self) -> Option<&[String]> {
        self.columns.as_deref().map(ColumnSet::names)
    }

    /// Add a row to the result set. A no-op until column names are set.
    pub fn add_row_values(&mut self, row_values: Vec<RowValue>) {
        if let Some(columns) = &self.columns {
            self.results.push(CustomDbRow::new(columns.clone(), row_values));
        }
    }

    /// Number of rows in the result.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
