//! Parameter binding and named-placeholder resolution.
//!
//! SQL text submitted to the transport always carries positional `:N`
//! placeholders. Positional params pass through untouched; named params are
//! resolved here, so callers never have to keep a mapping's iteration order
//! aligned with hand-numbered placeholders.

use std::borrow::Cow;

mod scanner;

use scanner::{
    State, is_block_comment_end, is_block_comment_start, is_line_comment_start, scan_identifier,
};

use crate::error::WarehouseDbError;
use crate::types::RowValue;

/// Parameters for a query or statement execution.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// No binds.
    #[default]
    None,
    /// Binds positionally aligned with `:1`, `:2`, ... in the SQL text.
    Positional(Vec<RowValue>),
    /// Binds referenced from the SQL text as `:name`; placeholder numbering
    /// is generated during resolution, in first-appearance order.
    Named(Vec<(String, RowValue)>),
}

impl Params {
    #[must_use]
    pub fn positional(values: impl Into<Vec<RowValue>>) -> Self {
        Params::Positional(values.into())
    }

    #[must_use]
    pub fn named(pairs: impl Into<Vec<(String, RowValue)>>) -> Self {
        Params::Named(pairs.into())
    }
}

/// Resolve params against the SQL text, producing the text and positional
/// bind list handed to the transport.
///
/// Returns a borrowed `Cow` when the text needs no rewriting.
///
/// # Errors
/// Returns `WarehouseDbError::ParameterError` if the SQL references a named
/// placeholder with no value in the map. Unused map entries are not an error.
pub fn resolve_binds<'q>(
    sql: &'q str,
    params: &Params,
) -> Result<(Cow<'q, str>, Vec<RowValue>), WarehouseDbError> {
    match params {
        Params::None => Ok((Cow::Borrowed(sql), Vec::new())),
        Params::Positional(values) => Ok((Cow::Borrowed(sql), values.clone())),
        Params::Named(pairs) => bind_named(sql, pairs),
    }
}

/// Rewrite `:name` placeholders to `:N` and order binds by first appearance.
///
/// Placeholders inside quoted strings and comments are left alone, as are
/// `::type` casts and `:1`-style digit placeholders. A repeated name reuses
/// its first index, binding the value once.
fn bind_named<'q>(
    sql: &'q str,
    pairs: &[(String, RowValue)],
) -> Result<(Cow<'q, str>, Vec<RowValue>), WarehouseDbError> {
    let bytes = sql.as_bytes();
    let mut out: Option<Vec<u8>> = None;
    let mut state = State::Normal;
    let mut idx = 0;
    let mut seen: Vec<&str> = Vec::new();
    let mut binds: Vec<RowValue> = Vec::new();

    while idx < bytes.len() {
        let b = bytes[idx];
        let mut replaced = false;
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => state = State::BlockComment(1),
                b':' if bytes.get(idx + 1) == Some(&b':') => {
                    // `::` cast, copy both colons through
                    if let Some(buf) = out.as_mut() {
                        buf.extend_from_slice(b"::");
                    }
                    idx += 1;
                    replaced = true;
                }
                b':' => {
                    if let Some((end, name)) = scan_identifier(bytes, idx + 1) {
                        let position = match seen.iter().position(|n| *n == name) {
                            Some(pos) => pos,
                            None => {
                                let (_, value) =
                                    pairs.iter().find(|(n, _)| n == name).ok_or_else(|| {
                                        WarehouseDbError::ParameterError(format!(
                                            "no value bound for placeholder :{name}"
                                        ))
                                    })?;
                                seen.push(name);
                                binds.push(value.clone());
                                seen.len() - 1
                            }
                        };
                        let buf = out.get_or_insert_with(|| bytes[..idx].to_vec());
                        buf.push(b':');
                        buf.extend_from_slice((position + 1).to_string().as_bytes());
                        idx = end - 1;
                        replaced = true;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        if let Some(buf) = out.as_mut() {
                            buf.push(b'\'');
                        }
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        if let Some(buf) = out.as_mut() {
                            buf.push(b'"');
                        }
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                } else if is_block_comment_end(bytes, idx) {
                    if depth == 1 {
                        state = State::Normal;
                    } else {
                        state = State::BlockComment(depth - 1);
                    }
                }
            }
        }

        if let Some(buf) = out.as_mut()
            && !replaced
        {
            buf.push(b);
        }

        idx += 1;
    }

    match out {
        Some(buf) => {
            let text = String::from_utf8(buf).map_err(|e| {
                WarehouseDbError::ParameterError(format!("placeholder rewrite produced invalid text: {e}"))
            })?;
            Ok((Cow::Owned(text), binds))
        }
        None => Ok((Cow::Borrowed(sql), binds)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(pairs: &[(&str, RowValue)]) -> Params {
        Params::named(
            pairs
                .iter()
                .map(|(n, v)| ((*n).to_string(), v.clone()))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn positional_params_pass_through() {
        let params = Params::positional(vec![RowValue::Int(1)]);
        let (sql, binds) = resolve_binds("SELECT :1", &params).unwrap();
        assert!(matches!(sql, Cow::Borrowed(_)));
        assert_eq!(binds, vec![RowValue::Int(1)]);
    }

    #[test]
    fn named_placeholders_number_by_first_appearance() {
        let params = named(&[
            ("b", RowValue::Text("two".into())),
            ("a", RowValue::Text("one".into())),
        ]);
        let (sql, binds) =
            resolve_binds("SELECT * FROM t WHERE a = :a AND b = :b AND a2 = :a", &params).unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = :1 AND b = :2 AND a2 = :1");
        assert_eq!(
            binds,
            vec![RowValue::Text("one".into()), RowValue::Text("two".into())]
        );
    }

    #[test]
    fn casts_and_quoted_text_are_untouched() {
        let params = named(&[("v", RowValue::Int(9))]);
        let (sql, binds) = resolve_binds(
            "SELECT ':v', PARSE_JSON(:v)::ARRAY -- :skip\n/* :skip */ FROM t",
            &params,
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT ':v', PARSE_JSON(:1)::ARRAY -- :skip\n/* :skip */ FROM t"
        );
        assert_eq!(binds, vec![RowValue::Int(9)]);
    }

    #[test]
    fn digit_placeholders_survive_named_mode() {
        let params = named(&[("v", RowValue::Int(9))]);
        let (sql, _) = resolve_binds("SELECT :1, :v", &params).unwrap();
        assert_eq!(sql, "SELECT :1, :1");
    }

    #[test]
    fn missing_name_is_a_parameter_error() {
        let err = resolve_binds("SELECT :nope", &named(&[])).unwrap_err();
        assert!(matches!(err, WarehouseDbError::ParameterError(_)));
    }

    #[test]
    fn no_params_yields_no_binds() {
        let (sql, binds) = resolve_binds("SELECT 1", &Params::None).unwrap();
        assert_eq!(sql, "SELECT 1");
        assert!(binds.is_empty());
    }
}
