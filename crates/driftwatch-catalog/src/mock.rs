//! Mock catalog for tests and offline runs
//!
//! Stores column listings in memory and can inject per-table errors or a
//! failing connection, so drift detection and routing can be exercised
//! without warehouse credentials.

use crate::adapter::{FetchError, WarehouseAdapter};
use driftwatch_core::{ColumnDescriptor, TableRef};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory warehouse catalog
#[derive(Clone, Default)]
pub struct MockCatalog {
    schemas: Arc<RwLock<HashMap<String, Vec<ColumnDescriptor>>>>,
    errors: Arc<RwLock<HashMap<String, FetchError>>>,
    fail_connection: bool,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the columns returned for a table
    pub async fn add_columns(&self, table: TableRef, columns: Vec<ColumnDescriptor>) {
        self.schemas.write().await.insert(table.fqn(), columns);
    }

    /// Inject an error returned for a specific table
    pub async fn add_error(&self, table: TableRef, error: FetchError) {
        self.errors.write().await.insert(table.fqn(), error);
    }

    /// Make every connection test fail
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub async fn table_count(&self) -> usize {
        self.schemas.read().await.len()
    }
}

#[async_trait::async_trait]
impl WarehouseAdapter for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn fetch_columns(&self, table: &TableRef) -> Result<Vec<ColumnDescriptor>, FetchError> {
        if let Some(error) = self.errors.read().await.get(&table.fqn()) {
            return Err(error.clone());
        }

        self.schemas
            .read()
            .await
            .get(&table.fqn())
            .cloned()
            .ok_or_else(|| FetchError::TableNotFound(table.fqn()))
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        if self.fail_connection {
            Err(FetchError::Network("simulated connection failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_core::WarehouseType;

    fn employees() -> TableRef {
        TableRef::new("WORMHOLE", "INGESTION", "EMPLOYEES")
    }

    #[tokio::test]
    async fn returns_registered_columns() {
        let catalog = MockCatalog::new();
        catalog
            .add_columns(
                employees(),
                vec![
                    ColumnDescriptor::new("id", WarehouseType::Number),
                    ColumnDescriptor::new("name", WarehouseType::Text).with_max_length(50),
                ],
            )
            .await;

        let columns = catalog.fetch_columns(&employees()).await.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[1].max_length, Some(50));
    }

    #[tokio::test]
    async fn unknown_table_is_not_found() {
        let catalog = MockCatalog::new();
        let result = catalog.fetch_columns(&employees()).await;
        assert!(matches!(result, Err(FetchError::TableNotFound(_))));
    }

    #[tokio::test]
    async fn injected_errors_win() {
        let catalog = MockCatalog::new();
        catalog
            .add_columns(employees(), vec![ColumnDescriptor::new("id", WarehouseType::Number)])
            .await;
        catalog
            .add_error(employees(), FetchError::PermissionDenied("nope".to_string()))
            .await;

        let result = catalog.fetch_columns(&employees()).await;
        assert!(matches!(result, Err(FetchError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn connection_failure_toggle() {
        assert!(MockCatalog::new().test_connection().await.is_ok());
        assert!(MockCatalog::new()
            .with_connection_failure()
            .test_connection()
            .await
            .is_err());
    }
}
