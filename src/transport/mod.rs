//! Capability interface to the warehouse engine's native client.
//!
//! The middleware never talks to a wire protocol directly; it drives these
//! traits, and a transport implementation (or the scripted mock in
//! `test_utils`) supplies connections and statement handles.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::WarehouseDbError;
use crate::types::RowValue;

/// Connection options parsed from a flat credential string.
///
/// The source format is `key:value,key:value`. Parsing is tolerant: pairs
/// without a colon are dropped silently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    values: HashMap<String, String>,
}

impl ConnectOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat `key:value,key:value` credential string.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut options = Self::new();
        for pair in text.split(',') {
            if let Some((key, value)) = pair.split_once(':') {
                options.insert(key.trim(), value.trim());
            }
        }
        options
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One field of a transport-native row, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// Warehouse-native date/timestamp wrapper, carried as the engine's text
    /// form until normalization.
    Timestamp(String),
    Array(Vec<WireValue>),
    Object(Vec<(String, WireValue)>),
}

/// A transport-native row: field name/value pairs in projection order.
pub type WireRow = Vec<(String, WireValue)>;

/// Completion status reported by a statement handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementStatus {
    /// Still in progress; the execute path keeps polling.
    Fetching,
    Complete,
    Aborted,
}

impl StatementStatus {
    /// Whether this status ends the execute-path poll loop.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, StatementStatus::Fetching)
    }
}

/// Factory for live connections.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection with the given options.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::ConnectionError` (or a transport-specific
    /// variant) if the connection cannot be established.
    async fn connect(
        &self,
        options: &ConnectOptions,
    ) -> Result<Box<dyn TransportConnection>, WarehouseDbError>;
}

/// A live connection checked out of the pool.
#[async_trait]
pub trait TransportConnection: Send {
    /// Submit a statement with positional binds.
    ///
    /// # Errors
    /// Returns an error if the engine rejects the statement; the executor
    /// wraps it with the SQL text and params before surfacing it.
    async fn submit(
        &mut self,
        sql: &str,
        binds: &[RowValue],
    ) -> Result<Box<dyn StatementHandle>, WarehouseDbError>;
}

/// An in-flight statement.
#[async_trait]
pub trait StatementHandle: Send {
    /// Pull the next result row; `None` ends the stream.
    ///
    /// # Errors
    /// A stream error fails the whole operation; rows already buffered by the
    /// caller are discarded.
    async fn next_row(&mut self) -> Result<Option<WireRow>, WarehouseDbError>;

    /// Read the statement's completion status (polled by the execute path).
    ///
    /// # Errors
    /// Returns an error if the status cannot be read.
    async fn status(&mut self) -> Result<StatementStatus, WarehouseDbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_tolerant_of_malformed_pairs() {
        let options =
            ConnectOptions::parse("account: acme-prod , user:loader,garbage,password:hunter2");
        assert_eq!(options.len(), 3);
        assert_eq!(options.get("account"), Some("acme-prod"));
        assert_eq!(options.get("user"), Some("loader"));
        assert_eq!(options.get("password"), Some("hunter2"));
        assert_eq!(options.get("garbage"), None);
    }

    #[test]
    fn parse_of_empty_text_is_empty() {
        assert!(ConnectOptions::parse("").is_empty());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!StatementStatus::Fetching.is_terminal());
        assert!(StatementStatus::Complete.is_terminal());
        assert!(StatementStatus::Aborted.is_terminal());
    }
}
