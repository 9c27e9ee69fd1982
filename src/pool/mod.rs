//! Bounded connection pool over the transport capability.
//!
//! The pool is an explicit handle owned by the caller (usually inside a
//! [`crate::WarehouseClient`]); there is no process-wide singleton.
//! Connections are created lazily on first checkout, so a freshly built pool
//! holds zero idle connections.

use std::sync::Arc;
use std::time::Duration;

use deadpool::managed::{Manager, Metrics, Object, Pool, RecycleResult};

use crate::error::WarehouseDbError;
use crate::transport::{ConnectOptions, Transport, TransportConnection};

/// Required credential string, flat `key:value,key:value` form.
pub const CREDENTIALS_ENV: &str = "WAREHOUSE_CREDENTIALS";

/// Optional override for the maximum concurrent-connection count.
pub const POOL_MAX_ENV: &str = "WAREHOUSE_POOL_MAX";

const DEFAULT_POOL_MAX: usize = 1;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Pool and executor configuration.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Credentials handed to the transport when a connection is created.
    pub credentials: ConnectOptions,
    /// Maximum concurrent connections; callers beyond the bound queue.
    pub max_connections: usize,
    /// Sleep between completion-status polls on the execute path.
    pub poll_interval: Duration,
    /// Upper bound on the execute-path poll loop. `None` preserves the
    /// engine's at-least-eventually-completes assumption and waits forever.
    pub execute_timeout: Option<Duration>,
}

impl WarehouseConfig {
    #[must_use]
    pub fn new(credentials: ConnectOptions) -> Self {
        Self {
            credentials,
            max_connections: DEFAULT_POOL_MAX,
            poll_interval: DEFAULT_POLL_INTERVAL,
            execute_timeout: None,
        }
    }

    /// Build a config from the process environment.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::ConfigError` if `WAREHOUSE_CREDENTIALS` is
    /// not set. An unparseable `WAREHOUSE_POOL_MAX` falls back to the default
    /// of 1.
    pub fn from_env() -> Result<Self, WarehouseDbError> {
        Self::from_vars(
            std::env::var(CREDENTIALS_ENV).ok(),
            std::env::var(POOL_MAX_ENV).ok(),
        )
    }

    fn from_vars(
        credentials: Option<String>,
        pool_max: Option<String>,
    ) -> Result<Self, WarehouseDbError> {
        let raw = credentials.ok_or_else(|| {
            WarehouseDbError::ConfigError(format!(
                "required environment variable {CREDENTIALS_ENV} is not set"
            ))
        })?;
        let mut config = Self::new(ConnectOptions::parse(&raw));
        if let Some(raw_max) = pool_max
            && let Ok(max) = raw_max.trim().parse::<usize>()
            && max > 0
        {
            config.max_connections = max;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn with_execute_timeout(mut self, execute_timeout: Option<Duration>) -> Self {
        self.execute_timeout = execute_timeout;
        self
    }
}

/// Deadpool manager that creates connections through the transport.
pub struct TransportManager {
    transport: Arc<dyn Transport>,
    options: ConnectOptions,
}

impl TransportManager {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, options: ConnectOptions) -> Self {
        Self { transport, options }
    }
}

impl Manager for TransportManager {
    type Type = Box<dyn TransportConnection>;
    type Error = WarehouseDbError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        self.transport.connect(&self.options).await
    }

    async fn recycle(
        &self,
        _conn: &mut Self::Type,
        _metrics: &Metrics,
    ) -> RecycleResult<Self::Error> {
        Ok(())
    }
}

/// A connection checked out of the pool. Dropping it returns the connection,
/// on success and failure paths alike.
pub type PooledConnection = Object<TransportManager>;

/// Bounded pool of transport connections.
#[derive(Clone)]
pub struct WarehousePool {
    inner: Pool<TransportManager>,
}

// Manual Debug implementation because the transport trait object isn't Debug
impl std::fmt::Debug for WarehousePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehousePool")
            .field("status", &self.inner.status())
            .finish_non_exhaustive()
    }
}

impl WarehousePool {
    /// Build a pool bounded by `config.max_connections`.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::ConfigError` if the pool cannot be built.
    pub fn new(
        transport: Arc<dyn Transport>,
        config: &WarehouseConfig,
    ) -> Result<Self, WarehouseDbError> {
        let manager = TransportManager::new(transport, config.credentials.clone());
        let inner = Pool::builder(manager)
            .max_size(config.max_connections)
            .build()
            .map_err(|e| {
                WarehouseDbError::ConfigError(format!("failed to build connection pool: {e}"))
            })?;
        Ok(Self { inner })
    }

    /// Check a connection out of the pool, waiting if the bound is reached.
    ///
    /// # Errors
    /// Returns `WarehouseDbError::ConnectionError` if the pool cannot provide
    /// a connection, including transport connect failures.
    pub async fn acquire(&self) -> Result<PooledConnection, WarehouseDbError> {
        Ok(self.inner.get().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockTransport;

    #[test]
    fn missing_credentials_is_fatal() {
        let err = WarehouseConfig::from_vars(None, None).unwrap_err();
        assert!(matches!(err, WarehouseDbError::ConfigError(_)));
        assert!(err.to_string().contains(CREDENTIALS_ENV));
    }

    #[test]
    fn pool_max_override_and_fallback() {
        let creds = Some("account:a,user:u".to_string());
        let config = WarehouseConfig::from_vars(creds.clone(), Some("4".into())).unwrap();
        assert_eq!(config.max_connections, 4);

        let config = WarehouseConfig::from_vars(creds.clone(), Some("zero".into())).unwrap();
        assert_eq!(config.max_connections, 1);

        let config = WarehouseConfig::from_vars(creds, None).unwrap();
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.execute_timeout.is_none());
    }

    #[tokio::test]
    async fn pool_creates_connections_lazily() {
        let transport = Arc::new(MockTransport::new());
        let config = WarehouseConfig::new(ConnectOptions::parse("account:a"));
        let pool = WarehousePool::new(transport.clone(), &config).unwrap();
        assert_eq!(transport.connect_count(), 0);

        let conn = pool.acquire().await.unwrap();
        assert_eq!(transport.connect_count(), 1);
        drop(conn);

        // A second checkout reuses the pooled connection.
        let _conn = pool.acquire().await.unwrap();
        assert_eq!(transport.connect_count(), 1);
    }
}
