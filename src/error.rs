use thiserror::Error;

/// Errors surfaced by the middleware.
///
/// Every error surfaces to the immediate caller; nothing in this crate
/// retries a failed database operation or downgrades an error to a log line.
#[derive(Debug, Error)]
pub enum WarehouseDbError {
    /// A value offered to `safe_value`/`safe_url` failed its type, pattern,
    /// or length check.
    #[error("Unsafe value for query: {0}")]
    UnsafeValue(String),

    /// Text offered to the `SafeLiteral` constructor failed its
    /// character-class check.
    #[error("Unsafe literal for query: \"{0}\"")]
    UnsafeLiteral(String),

    /// A bulk-insert target failed identifier validation.
    #[error("Unsafe table name for query: \"{0}\"")]
    UnsafeTableName(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Named-placeholder resolution failed.
    #[error("Parameter binding error: {0}")]
    ParameterError(String),

    /// The transport rejected a statement. Carries the original SQL text and
    /// rendered params so the failure is diagnosable without verbose logging.
    #[error("Statement submission failed: {message}\nQUERY: {sql}\nPARAMS: {params}")]
    SubmissionError {
        message: String,
        sql: String,
        params: String,
    },

    /// A row stream failed mid-consumption; buffered rows are discarded.
    #[error("Row stream error: {0}")]
    StreamError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl From<deadpool::managed::PoolError<WarehouseDbError>> for WarehouseDbError {
    fn from(err: deadpool::managed::PoolError<WarehouseDbError>) -> Self {
        WarehouseDbError::ConnectionError(format!("connection pool error: {err}"))
    }
}
