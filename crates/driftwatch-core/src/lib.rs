//! Driftwatch Core
//!
//! Stable domain model shared by every stage of the pipeline.
//! Change-type wire names are part of the persisted history format -
//! never rename them, only add new ones.

pub mod change;
pub mod column;
pub mod config;
pub mod error;
pub mod report;
pub mod table;

pub use change::{ChangeRecord, ChangeType};
pub use column::{ColumnDescriptor, InferredColumnDescriptor, InferredType, NormalizedColumn, WarehouseType};
pub use config::{Config, ConfigError, MonitorConfig, NotifyConfig, WarehouseConfig};
pub use error::DriftError;
pub use report::{DriftReport, ReportSummary, ReportVersion};
pub use table::TableRef;
