//! Wire-row normalization: lower-cased field names and standard timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::transport::{WireRow, WireValue};
use crate::types::{Row, RowValue};

/// Normalize one transport row: every field name is lower-cased and every
/// value runs through [`normalize_wire_value`].
pub(crate) fn normalize_wire_row(row: WireRow) -> (Vec<String>, Vec<RowValue>) {
    let mut names = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (name, value) in row {
        names.push(name.to_lowercase());
        values.push(normalize_wire_value(value));
    }
    (names, values)
}

/// Convert a transport value to its normalized form.
///
/// Warehouse date/timestamp wrappers become `NaiveDateTime`; arrays are
/// mapped element-wise and nested objects field-wise; other scalars pass
/// through unchanged. A wrapper that matches no known datetime format
/// degrades to text instead of failing the row.
pub(crate) fn normalize_wire_value(value: WireValue) -> RowValue {
    match value {
        WireValue::Null => RowValue::Null,
        WireValue::Int(v) => RowValue::Int(v),
        WireValue::Float(v) => RowValue::Float(v),
        WireValue::Text(s) => RowValue::Text(s),
        WireValue::Bool(b) => RowValue::Bool(b),
        WireValue::Timestamp(raw) => match parse_timestamp(&raw) {
            Some(ts) => RowValue::Timestamp(ts),
            None => RowValue::Text(raw),
        },
        WireValue::Array(items) => {
            RowValue::Array(items.into_iter().map(normalize_wire_value).collect())
        }
        WireValue::Object(fields) => {
            let mut row = Row::new();
            for (name, value) in fields {
                row.set(name, normalize_wire_value(value));
            }
            RowValue::Object(row)
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
