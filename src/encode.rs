//! Row projection encoding for bulk insert.

use crate::types::{Row, RowValue};

/// Encode one row as the projection list of a single `SELECT` clause,
/// appending bound values to `binds`.
///
/// Numbers, booleans, NULL, and safe literals are emitted inline; composite
/// values are bound as JSON text behind a `PARSE_JSON` placeholder; text and
/// timestamps are bound behind a plain placeholder. Placeholders are numbered
/// from the running length of `binds`, so one bind list can accumulate across
/// every row of a bulk insert.
pub fn encode_row_values(row: &Row, binds: &mut Vec<RowValue>) -> String {
    let mut fragments = Vec::with_capacity(row.len());
    for (_, value) in row.iter() {
        let fragment = match value {
            RowValue::Null => "NULL".to_string(),
            RowValue::Literal(lit) => lit.as_str().to_string(),
            RowValue::Array(_) => {
                binds.push(RowValue::Text(value.to_json().to_string()));
                format!("PARSE_JSON(:{})::ARRAY", binds.len())
            }
            RowValue::Object(_) => {
                binds.push(RowValue::Text(value.to_json().to_string()));
                format!("PARSE_JSON(:{})", binds.len())
            }
            RowValue::Int(v) => v.to_string(),
            RowValue::Float(v) => v.to_string(),
            RowValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            RowValue::Text(_) | RowValue::Timestamp(_) => {
                binds.push(value.clone());
                format!(":{}", binds.len())
            }
        };
        fragments.push(fragment);
    }
    fragments.join(", ")
}
