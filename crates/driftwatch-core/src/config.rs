//! Configuration schema (driftwatch.toml)
//!
//! The original system loaded shared mutable configuration from object
//! storage on every invocation; here the caller loads an explicit struct
//! once and passes it down. The diff engine itself takes no configuration.

use serde::{Deserialize, Serialize};

/// Warehouse connection settings
///
/// The password is deliberately not part of the file; the CLI reads it
/// from `DRIFTWATCH_PASSWORD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub account: String,
    pub user: String,
    pub database: String,

    /// Compute warehouse to run catalog queries on
    #[serde(default)]
    pub warehouse: Option<String>,

    #[serde(default)]
    pub role: Option<String>,
}

/// Which tables are watched for drift
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub database: String,
    pub schema: String,

    /// Table names to compare incoming files against
    #[serde(default)]
    pub tables: Vec<String>,
}

/// Chat notification settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Incoming-webhook URL; notifications are skipped when unset
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Load config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// True when a table is on the monitored list
    pub fn monitors(&self, table: &str) -> bool {
        self.monitor.tables.iter().any(|t| t == table)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = Config::from_toml(
            r#"
            [warehouse]
            account = "xy12345.ap-southeast-2"
            user = "loader"
            database = "WORMHOLE"
            warehouse = "COMPUTE_WH"
            role = "SYSADMIN"

            [monitor]
            database = "WORMHOLE"
            schema = "INGESTION"
            tables = ["EMPLOYEES"]

            [notify]
            webhook_url = "https://hooks.example.com/services/T000/B000/x"
            "#,
        )
        .unwrap();

        assert_eq!(config.warehouse.account, "xy12345.ap-southeast-2");
        assert_eq!(config.monitor.tables, vec!["EMPLOYEES"]);
        assert!(config.monitors("EMPLOYEES"));
        assert!(!config.monitors("ORDERS"));
        assert!(config.notify.webhook_url.is_some());
    }

    #[test]
    fn missing_sections_default() {
        let config = Config::from_toml("").unwrap();
        assert!(config.monitor.tables.is_empty());
        assert!(config.notify.webhook_url.is_none());
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = Config::from_toml("[warehouse").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
