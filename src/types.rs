use chrono::NaiveDateTime;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use crate::safety::SafeLiteral;

/// Values that can appear in a row, a query parameter, or a query result.
///
/// One explicit variant per value kind the encoder knows how to emit, so the
/// encoding rules live in a single match per call site instead of runtime
/// type inspection:
/// ```rust
/// use warehouse_middleware::prelude::*;
///
/// let row = Row::new()
///     .with("id", RowValue::Int(1))
///     .with("name", RowValue::Text("alice".into()));
/// # let _ = row;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// Array value; bound as a JSON literal with an array cast
    Array(Vec<RowValue>),
    /// Nested object value; bound as a JSON literal
    Object(Row),
    /// Pre-validated text spliced into SQL verbatim
    Literal(SafeLiteral),
}

impl RowValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Render this value as JSON, for the JSON-literal bind paths.
    ///
    /// Timestamps render as ISO-8601 text; a safe literal renders as its
    /// trusted text. Non-finite floats degrade to JSON null.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValue::Int(v) => JsonValue::Number((*v).into()),
            RowValue::Float(v) => {
                JsonNumber::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number)
            }
            RowValue::Text(s) => JsonValue::String(s.clone()),
            RowValue::Bool(b) => JsonValue::Bool(*b),
            RowValue::Timestamp(ts) => {
                JsonValue::String(ts.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
            }
            RowValue::Null => JsonValue::Null,
            RowValue::Array(items) => {
                JsonValue::Array(items.iter().map(RowValue::to_json).collect())
            }
            RowValue::Object(row) => {
                let mut map = JsonMap::new();
                for (name, value) in row.iter() {
                    map.insert(name.to_string(), value.to_json());
                }
                JsonValue::Object(map)
            }
            RowValue::Literal(lit) => JsonValue::String(lit.as_str().to_string()),
        }
    }
}

/// An ordered mapping from field name to value.
///
/// Field insertion order is significant: it fixes the emitted column list and
/// the SELECT projection order for bulk inserts. Every row in one bulk insert
/// must share the key set and key order of the first row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, RowValue)>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, replacing an existing field in place.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: RowValue) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace a field. A replaced field keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: RowValue) {
        let name = name.into();
        if let Some(existing) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Field names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, RowValue)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, RowValue)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(name, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_preserves_insertion_order() {
        let row = Row::new()
            .with("b", RowValue::Int(2))
            .with("a", RowValue::Int(1))
            .with("b", RowValue::Int(3));
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["b", "a"]);
        assert_eq!(row.get("b"), Some(&RowValue::Int(3)));
    }

    #[test]
    fn to_json_renders_nested_values() {
        let row = Row::new()
            .with("n", RowValue::Int(7))
            .with("tags", RowValue::Array(vec![RowValue::Text("x".into())]));
        let json = RowValue::Object(row).to_json();
        assert_eq!(json.to_string(), r#"{"n":7,"tags":["x"]}"#);
    }

    #[test]
    fn as_bool_coerces_int_flags() {
        assert_eq!(RowValue::Int(1).as_bool(), Some(&true));
        assert_eq!(RowValue::Int(0).as_bool(), Some(&false));
        assert_eq!(RowValue::Int(2).as_bool(), None);
    }
}
