//! Value and identifier sanitization.
//!
//! Inline SQL rendering is restricted to value kinds with no injection
//! surface; everything else either goes through a positional bind or is
//! rejected here.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::WarehouseDbError;
use crate::types::RowValue;

static VALUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9,./_-]*$").expect("value pattern compiles"));

static LITERAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9(),'._-]*$").expect("literal pattern compiles"));

static TABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9._]*$").expect("table pattern compiles"));

/// Longest string `safe_value` will render inline.
const MAX_INLINE_VALUE_LEN: usize = 64;

/// Longest string `safe_url` will attempt to parse.
const MAX_URL_LEN: usize = 500;

/// A string pre-validated for verbatim splicing into SQL.
///
/// This is the single sanctioned bypass of the sanitizer. The character class
/// permits parentheses and quotes, unlike the stricter value and identifier
/// patterns, so literals can carry function calls such as
/// `CURRENT_TIMESTAMP()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeLiteral {
    text: String,
}

impl SafeLiteral {
    /// Validate and wrap literal text.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::UnsafeLiteral` if the text contains any
    /// character outside `[A-Za-z0-9(),'._-]`.
    pub fn new(text: impl Into<String>) -> Result<Self, WarehouseDbError> {
        let text = text.into();
        if !LITERAL_PATTERN.is_match(&text) {
            return Err(WarehouseDbError::UnsafeLiteral(text));
        }
        Ok(Self { text })
    }

    /// The validated text, trusted verbatim from here on.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Render a value as an inline SQL literal.
///
/// Numbers render as their decimal form. Strings matching
/// `^[A-Za-z0-9,./_-]*$` with length <= 64 render single-quoted; any other
/// string renders as the SQL `null` keyword. That fail-closed branch is
/// policy, not an error path: callers needing strict rejection should bind
/// the value instead.
///
/// # Errors
/// Returns `WarehouseDbError::UnsafeValue` for every non-number, non-string
/// variant.
pub fn safe_value(value: &RowValue) -> Result<String, WarehouseDbError> {
    match value {
        RowValue::Int(v) => Ok(v.to_string()),
        RowValue::Float(v) => Ok(v.to_string()),
        RowValue::Text(s) => {
            if VALUE_PATTERN.is_match(s) && s.len() <= MAX_INLINE_VALUE_LEN {
                Ok(format!("'{s}'"))
            } else {
                // Fail closed to the null keyword rather than erroring.
                Ok("null".to_string())
            }
        }
        other => Err(WarehouseDbError::UnsafeValue(format!("{other:?}"))),
    }
}

/// Render a URL string as an inline SQL literal.
///
/// URLs exceed the 64-character allowance of [`safe_value`] but are low risk
/// once canonicalized through a URL parser; any single quote surviving
/// canonicalization is replaced with `%60` before quoting.
///
/// # Errors
/// Returns `WarehouseDbError::UnsafeValue` for non-text values, strings of
/// 500 or more characters, and text that fails URL parsing.
pub fn safe_url(value: &RowValue) -> Result<String, WarehouseDbError> {
    match value {
        // Character count, not byte length; the limit predates any encoding.
        RowValue::Text(s) if s.chars().count() < MAX_URL_LEN => {
            let parsed = Url::parse(s)
                .map_err(|e| WarehouseDbError::UnsafeValue(format!("{s}: {e}")))?;
            Ok(format!("'{}'", parsed.as_str().replace('\'', "%60")))
        }
        other => Err(WarehouseDbError::UnsafeValue(format!("{other:?}"))),
    }
}

/// Validate a bulk-insert target. Dotted `schema.table` names are permitted.
pub(crate) fn validate_table_name(table: &str) -> Result<(), WarehouseDbError> {
    if TABLE_PATTERN.is_match(table) {
        Ok(())
    } else {
        Err(WarehouseDbError::UnsafeTableName(table.to_string()))
    }
}
