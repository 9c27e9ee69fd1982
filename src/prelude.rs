//! Convenient imports for common functionality.

pub use crate::binding::{Params, resolve_binds};
pub use crate::client::WarehouseClient;
pub use crate::error::WarehouseDbError;
pub use crate::pool::{WarehouseConfig, WarehousePool};
pub use crate::results::{ColumnSet, CustomDbRow, LoadResult, ResultSet};
pub use crate::safety::{SafeLiteral, safe_url, safe_value};
pub use crate::transport::{
    ConnectOptions, StatementHandle, StatementStatus, Transport, TransportConnection, WireRow,
    WireValue,
};
pub use crate::types::{Row, RowValue};
