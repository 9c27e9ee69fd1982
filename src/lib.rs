//! Safety and ergonomics layer in front of a warehouse SQL engine's native
//! client: parameterized queries and bulk inserts without interpolating
//! untrusted data into SQL text, behind a small pooled-execution surface.

pub mod binding;
pub mod client;
pub mod encode;
pub mod error;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod safety;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod transport;
pub mod types;

pub use binding::{Params, resolve_binds};
pub use client::WarehouseClient;
pub use encode::encode_row_values;
pub use error::WarehouseDbError;
pub use pool::{
    CREDENTIALS_ENV, POOL_MAX_ENV, PooledConnection, TransportManager, WarehouseConfig,
    WarehousePool,
};
pub use results::{ColumnSet, CustomDbRow, LoadResult, ResultSet};
pub use safety::{SafeLiteral, safe_url, safe_value};
pub use transport::{
    ConnectOptions, StatementHandle, StatementStatus, Transport, TransportConnection, WireRow,
    WireValue,
};
pub use types::{Row, RowValue};
