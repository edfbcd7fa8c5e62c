//! Warehouse adapter trait

use driftwatch_core::{ColumnDescriptor, TableRef};

/// Errors that can occur when fetching a table's registered columns
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Trait for warehouses that can report a table's registered columns
///
/// Implementations query the warehouse's INFORMATION_SCHEMA (or an
/// equivalent metadata surface) and translate each row into a
/// [`ColumnDescriptor`] in ordinal position order.
#[async_trait::async_trait]
pub trait WarehouseAdapter: Send + Sync {
    /// Adapter name (e.g. "Snowflake")
    fn name(&self) -> &'static str;

    /// Fetch the registered columns for one table
    async fn fetch_columns(&self, table: &TableRef) -> Result<Vec<ColumnDescriptor>, FetchError>;

    /// Validate credentials and reachability before real work
    async fn test_connection(&self) -> Result<(), FetchError>;
}
