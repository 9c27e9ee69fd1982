mod normalize;
mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::{ColumnSet, CustomDbRow};

pub(crate) use normalize::normalize_wire_row;

use serde::{Deserialize, Serialize};

use crate::error::WarehouseDbError;
use crate::types::RowValue;

/// Per-file status row returned by the engine for a load command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    pub file: String,
    pub status: String,
    pub rows_parsed: i64,
    pub rows_loaded: i64,
    pub error_limit: i64,
    pub errors_seen: i64,
    pub command: String,
}

impl LoadResult {
    /// Decode a normalized load-status row.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::ExecutionError` if a column is missing or
    /// has an unexpected kind.
    pub fn from_row(row: &CustomDbRow) -> Result<Self, WarehouseDbError> {
        Ok(Self {
            file: text_field(row, "file")?,
            status: text_field(row, "status")?,
            rows_parsed: int_field(row, "rows_parsed")?,
            rows_loaded: int_field(row, "rows_loaded")?,
            error_limit: int_field(row, "error_limit")?,
            errors_seen: int_field(row, "errors_seen")?,
            command: text_field(row, "command")?,
        })
    }
}

fn text_field(row: &CustomDbRow, name: &str) -> Result<String, WarehouseDbError> {
    row.get(name)
        .and_then(RowValue::as_text)
        .map(str::to_string)
        .ok_or_else(|| missing(name))
}

fn int_field(row: &CustomDbRow, name: &str) -> Result<i64, WarehouseDbError> {
    row.get(name)
        .and_then(RowValue::as_int)
        .copied()
        .ok_or_else(|| missing(name))
}

fn missing(name: &str) -> WarehouseDbError {
    WarehouseDbError::ExecutionError(format!("load result row is missing column \"{name}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn load_row() -> CustomDbRow {
        CustomDbRow::new(
            Arc::new(ColumnSet::new(
                ["file", "status", "rows_parsed", "rows_loaded", "error_limit", "errors_seen", "command"]
                    .map(str::to_string)
                    .to_vec(),
            )),
            vec![
                RowValue::Text("data.csv.gz".into()),
                RowValue::Text("LOADED".into()),
                RowValue::Int(100),
                RowValue::Int(100),
                RowValue::Int(1),
                RowValue::Int(0),
                RowValue::Text("COPY".into()),
            ],
        )
    }

    #[test]
    fn load_result_decodes_a_status_row() {
        let decoded = LoadResult::from_row(&load_row()).unwrap();
        assert_eq!(decoded.file, "data.csv.gz");
        assert_eq!(decoded.rows_loaded, 100);
        assert_eq!(decoded.errors_seen, 0);
    }

    #[test]
    fn load_result_reports_missing_columns() {
        let row = CustomDbRow::new(
            Arc::new(ColumnSet::new(vec!["file".to_string()])),
            vec![RowValue::Null],
        );
        let err = LoadResult::from_row(&row).unwrap_err();
        assert!(err.to_string().contains("file"));
    }
}
