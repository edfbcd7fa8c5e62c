//! Snowflake catalog adapter over INFORMATION_SCHEMA.COLUMNS
//!
//! Requires USAGE on the database and schema plus SELECT on the
//! INFORMATION_SCHEMA views. Supports password and key-pair
//! authentication; compiled in only with the `snowflake` feature.
//!
//! ```rust,ignore
//! let catalog = SnowflakeCatalog::with_password("xy12345.us-east-1", "loader", "secret")
//!     .with_warehouse("COMPUTE_WH")
//!     .with_role("SYSADMIN")
//!     .build()?;
//! let columns = catalog.fetch_columns(&TableRef::new("WORMHOLE", "INGESTION", "EMPLOYEES")).await?;
//! ```

use crate::adapter::{FetchError, WarehouseAdapter};
use driftwatch_core::{ColumnDescriptor, TableRef, WarehouseType};

#[cfg(feature = "snowflake")]
use snowflake_api::SnowflakeApi;

#[cfg(feature = "snowflake")]
use arrow_array::cast::AsArray;

#[cfg(feature = "snowflake")]
use arrow_array::types::Int64Type;

#[cfg(feature = "snowflake")]
use arrow_array::Array;

/// Snowflake authentication credentials
#[derive(Clone)]
enum Credentials {
    Password(String),
    /// PEM format private key
    PrivateKey(String),
}

/// Builder for [`SnowflakeCatalog`]
pub struct SnowflakeCatalogBuilder {
    account: String,
    username: String,
    credentials: Credentials,
    warehouse: Option<String>,
    role: Option<String>,
    database: Option<String>,
}

impl SnowflakeCatalogBuilder {
    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[cfg(feature = "snowflake")]
    pub fn build(self) -> Result<SnowflakeCatalog, FetchError> {
        let api = match &self.credentials {
            Credentials::Password(password) => SnowflakeApi::with_password_auth(
                &self.account,
                self.warehouse.as_deref(),
                self.database.as_deref(),
                None,
                &self.username,
                self.role.as_deref(),
                password,
            )
            .map_err(|e| FetchError::Authentication(format!("Snowflake auth failed: {}", e)))?,
            Credentials::PrivateKey(pem) => SnowflakeApi::with_certificate_auth(
                &self.account,
                self.warehouse.as_deref(),
                self.database.as_deref(),
                None,
                &self.username,
                self.role.as_deref(),
                pem,
            )
            .map_err(|e| FetchError::Authentication(format!("key-pair auth failed: {}", e)))?,
        };

        Ok(SnowflakeCatalog { api })
    }

    #[cfg(not(feature = "snowflake"))]
    pub fn build(self) -> Result<SnowflakeCatalog, FetchError> {
        Err(FetchError::Config(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string(),
        ))
    }
}

/// Snowflake warehouse catalog
pub struct SnowflakeCatalog {
    #[cfg(feature = "snowflake")]
    api: SnowflakeApi,

    #[cfg(not(feature = "snowflake"))]
    _phantom: std::marker::PhantomData<()>,
}

impl SnowflakeCatalog {
    /// Password-authenticated builder
    pub fn with_password(
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> SnowflakeCatalogBuilder {
        SnowflakeCatalogBuilder {
            account: account.into(),
            username: username.into(),
            credentials: Credentials::Password(password.into()),
            warehouse: None,
            role: None,
            database: None,
        }
    }

    /// Key-pair-authenticated builder
    pub fn with_key_pair(
        account: impl Into<String>,
        username: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> SnowflakeCatalogBuilder {
        SnowflakeCatalogBuilder {
            account: account.into(),
            username: username.into(),
            credentials: Credentials::PrivateKey(private_key_pem.into()),
            warehouse: None,
            role: None,
            database: None,
        }
    }

    /// The metadata query for one table's registered columns
    fn columns_query(table: &TableRef) -> String {
        format!(
            "select COLUMN_NAME, DATA_TYPE, CHARACTER_MAXIMUM_LENGTH \
             from {}.information_schema.columns \
             where table_catalog = '{}' and table_schema = '{}' and table_name = '{}' \
             order by ORDINAL_POSITION",
            table.database,
            table.database.to_uppercase(),
            table.schema.to_uppercase(),
            table.table.to_uppercase()
        )
    }
}

#[async_trait::async_trait]
impl WarehouseAdapter for SnowflakeCatalog {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    #[cfg(feature = "snowflake")]
    async fn fetch_columns(&self, table: &TableRef) -> Result<Vec<ColumnDescriptor>, FetchError> {
        use snowflake_api::QueryResult;

        let query = Self::columns_query(table);
        tracing::debug!(table = %table.fqn(), "querying information_schema.columns");

        let result = self.api.exec(&query).await.map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("does not exist") || err_str.contains("not found") {
                FetchError::TableNotFound(table.fqn())
            } else if err_str.contains("Insufficient privileges") || err_str.contains("Permission") {
                FetchError::PermissionDenied(format!("cannot access {}: {}", table.fqn(), err_str))
            } else {
                FetchError::Query(err_str)
            }
        })?;

        let mut columns = Vec::new();

        match result {
            QueryResult::Arrow(batches) => {
                for batch in batches {
                    let schema = batch.schema();

                    let name_idx = schema
                        .index_of("COLUMN_NAME")
                        .map_err(|_| FetchError::InvalidResponse("missing COLUMN_NAME".to_string()))?;
                    let type_idx = schema
                        .index_of("DATA_TYPE")
                        .map_err(|_| FetchError::InvalidResponse("missing DATA_TYPE".to_string()))?;
                    let length_idx = schema.index_of("CHARACTER_MAXIMUM_LENGTH").ok();

                    let name_array = batch.column(name_idx).as_string::<i32>();
                    let type_array = batch.column(type_idx).as_string::<i32>();

                    for row_idx in 0..batch.num_rows() {
                        let name = name_array.value(row_idx).to_string();
                        let declared_type = WarehouseType::from_catalog(type_array.value(row_idx));

                        let max_length = length_idx
                            .and_then(|idx| batch.column(idx).as_primitive_opt::<Int64Type>())
                            .and_then(|arr| {
                                if arr.is_null(row_idx) {
                                    None
                                } else {
                                    u32::try_from(arr.value(row_idx)).ok()
                                }
                            });

                        columns.push(ColumnDescriptor {
                            name,
                            declared_type,
                            max_length,
                        });
                    }
                }
            }
            QueryResult::Json(_) => {
                return Err(FetchError::InvalidResponse(
                    "unexpected JSON result format".to_string(),
                ));
            }
            QueryResult::Empty => {
                return Err(FetchError::TableNotFound(table.fqn()));
            }
        }

        if columns.is_empty() {
            return Err(FetchError::TableNotFound(table.fqn()));
        }

        Ok(columns)
    }

    #[cfg(not(feature = "snowflake"))]
    async fn fetch_columns(&self, _table: &TableRef) -> Result<Vec<ColumnDescriptor>, FetchError> {
        Err(FetchError::Config(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string(),
        ))
    }

    #[cfg(feature = "snowflake")]
    async fn test_connection(&self) -> Result<(), FetchError> {
        self.api
            .exec("SELECT 1")
            .await
            .map_err(|e| FetchError::Query(format!("connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(not(feature = "snowflake"))]
    async fn test_connection(&self) -> Result<(), FetchError> {
        Err(FetchError::Config(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string(),
        ))
    }
}
