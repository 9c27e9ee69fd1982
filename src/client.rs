//! The query executor and bulk insert composer.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::binding::{Params, resolve_binds};
use crate::encode::encode_row_values;
use crate::error::WarehouseDbError;
use crate::pool::{WarehouseConfig, WarehousePool};
use crate::results::{ResultSet, normalize_wire_row};
use crate::safety::validate_table_name;
use crate::transport::Transport;
use crate::types::{Row, RowValue};

/// Pooled client for a warehouse SQL engine.
///
/// Owns the connection pool and exposes the crate's execution surface:
/// [`query`](Self::query), [`execute`](Self::execute),
/// [`stage`](Self::stage), and [`insert`](Self::insert). Each call checks a
/// connection out of the pool and returns it when the call finishes, on both
/// success and failure paths.
pub struct WarehouseClient {
    pool: WarehousePool,
    poll_interval: Duration,
    execute_timeout: Option<Duration>,
}

impl WarehouseClient {
    /// Build a client over a transport with an explicit configuration.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::ConfigError` if the pool cannot be built.
    pub fn new(
        transport: Arc<dyn Transport>,
        config: WarehouseConfig,
    ) -> Result<Self, WarehouseDbError> {
        let pool = WarehousePool::new(transport, &config)?;
        Ok(Self {
            pool,
            poll_interval: config.poll_interval,
            execute_timeout: config.execute_timeout,
        })
    }

    /// Build a client from `WAREHOUSE_CREDENTIALS` / `WAREHOUSE_POOL_MAX`.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::ConfigError` if the credential variable is
    /// not set or the pool cannot be built.
    pub fn from_env(transport: Arc<dyn Transport>) -> Result<Self, WarehouseDbError> {
        Self::new(transport, WarehouseConfig::from_env()?)
    }

    #[must_use]
    pub fn pool(&self) -> &WarehousePool {
        &self.pool
    }

    /// Run a statement and materialize its row stream.
    ///
    /// Rows are pulled one at a time, so result size never has to be declared
    /// up front. Field names come back lower-cased and warehouse timestamp
    /// wrappers come back as `RowValue::Timestamp`.
    ///
    /// # Errors
    /// Submission failures surface as `WarehouseDbError::SubmissionError`
    /// carrying the SQL text and params; a mid-stream error fails the whole
    /// call and discards buffered rows.
    pub async fn query(&self, sql: &str, params: &Params) -> Result<ResultSet, WarehouseDbError> {
        let started = Instant::now();
        let (sql_text, binds) = resolve_binds(sql, params)?;
        debug!(sql = %sql_text, binds = binds.len(), "submitting query");

        let mut connection = self.pool.acquire().await?;
        let mut statement = connection
            .submit(&sql_text, &binds)
            .await
            .map_err(|err| submission_error(&err, &sql_text, &binds))?;

        let mut result_set = ResultSet::default();
        while let Some(wire_row) = statement.next_row().await? {
            let (names, values) = normalize_wire_row(wire_row);
            if result_set.get_column_names().is_none() {
                result_set.set_column_names(names);
            }
            result_set.add_row_values(values);
        }

        debug!(
            rows = result_set.len(),
            elapsed_ms = elapsed_ms(started),
            "query complete"
        );
        Ok(result_set)
    }

    /// Run a statement for effect, polling until its status is terminal.
    ///
    /// Polls every `poll_interval` (default 100ms) while the engine reports
    /// the statement as still fetching. With the default configuration there
    /// is no upper bound on the wait; set
    /// [`WarehouseConfig::execute_timeout`] to turn a stuck statement into an
    /// error.
    ///
    /// # Errors
    /// Submission failures surface as `WarehouseDbError::SubmissionError`;
    /// an elapsed `execute_timeout` surfaces as
    /// `WarehouseDbError::ExecutionError`.
    pub async fn execute(&self, sql: &str, params: &Params) -> Result<(), WarehouseDbError> {
        let started = Instant::now();
        let (sql_text, binds) = resolve_binds(sql, params)?;
        debug!(sql = %sql_text, binds = binds.len(), "submitting statement");

        let mut connection = self.pool.acquire().await?;
        let mut statement = connection
            .submit(&sql_text, &binds)
            .await
            .map_err(|err| submission_error(&err, &sql_text, &binds))?;

        let deadline = self.execute_timeout.map(|limit| started + limit);
        while !statement.status().await?.is_terminal() {
            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                return Err(WarehouseDbError::ExecutionError(format!(
                    "statement still in progress after {:?}",
                    self.execute_timeout.unwrap_or_default()
                )));
            }
            sleep(self.poll_interval).await;
        }

        debug!(elapsed_ms = elapsed_ms(started), "statement complete");
        Ok(())
    }

    /// Upload a local file to a named stage.
    ///
    /// Builds `PUT file://<file> @<stage_name> AUTO_COMPRESS=TRUE` and routes
    /// it through [`execute`](Self::execute). No sanitization is applied to
    /// `stage_name` or `file`; callers must pre-validate both.
    ///
    /// # Errors
    /// Propagates errors from the execute path.
    pub async fn stage(&self, stage_name: &str, file: &str) -> Result<(), WarehouseDbError> {
        let command = format!("PUT file://{file} @{stage_name} AUTO_COMPRESS=TRUE");
        self.execute(&command, &Params::None).await
    }

    /// Bulk insert rows as one `INSERT INTO ... SELECT ... UNION ALL ...`
    /// statement.
    ///
    /// The column list comes from the first row; every row must share its key
    /// set and key order. An empty slice is a no-op.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::UnsafeTableName` before any SQL is built if
    /// `table` fails identifier validation; otherwise propagates errors from
    /// the execute path.
    pub async fn insert(&self, table: &str, rows: &[Row]) -> Result<(), WarehouseDbError> {
        if rows.is_empty() {
            return Ok(());
        }
        validate_table_name(table)?;

        let columns = rows[0].columns().collect::<Vec<_>>().join(", ");
        let mut binds: Vec<RowValue> = Vec::new();
        let selects: Vec<String> = rows
            .iter()
            .map(|row| format!("SELECT {}", encode_row_values(row, &mut binds)))
            .collect();
        let sql = format!(
            "INSERT INTO {table}\n({columns})\n{}",
            selects.join(" UNION ALL\n")
        );
        self.execute(&sql, &Params::Positional(binds)).await
    }

    /// Bulk insert a single row.
    ///
    /// # Errors
    /// Same as [`insert`](Self::insert).
    pub async fn insert_row(&self, table: &str, row: Row) -> Result<(), WarehouseDbError> {
        self.insert(table, std::slice::from_ref(&row)).await
    }
}

fn submission_error(err: &WarehouseDbError, sql: &str, binds: &[RowValue]) -> WarehouseDbError {
    WarehouseDbError::SubmissionError {
        message: err.to_string(),
        sql: sql.to_string(),
        params: if binds.is_empty() {
            "none".to_string()
        } else {
            format!("{binds:?}")
        },
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
