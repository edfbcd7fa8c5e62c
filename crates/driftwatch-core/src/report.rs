//! Drift report envelope (stable v1)
//!
//! The report is the handoff payload between the detection stage and the
//! router. Breaking changes require a version bump.

use serde::{Deserialize, Serialize};

use crate::change::{ChangeRecord, ChangeType};
use crate::table::TableRef;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    pub major: u32,
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Per-change-type counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub additions: usize,
    pub removals: usize,
    pub renames: usize,
    pub type_changes: usize,
}

impl ReportSummary {
    fn tally(changes: &[ChangeRecord]) -> Self {
        let count = |t: ChangeType| changes.iter().filter(|c| c.change_type == t).count();
        Self {
            total: changes.len(),
            additions: count(ChangeType::AddColumn),
            removals: count(ChangeType::RemoveColumn),
            renames: count(ChangeType::RenameColumn),
            type_changes: count(ChangeType::ChangedDataType),
        }
    }
}

/// A classified change list for one table
///
/// An empty report is the valid "no drift detected" outcome; downstream
/// it triggers normal data loading instead of DDL planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub generated_at: String,

    /// Table the comparison ran against
    pub table: TableRef,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Changes in contractual order
    pub changes: Vec<ChangeRecord>,
}

impl DriftReport {
    /// Build a report from an already-sorted change list
    pub fn new(table: TableRef, generated_at: impl Into<String>, changes: Vec<ChangeRecord>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            generated_at: generated_at.into(),
            table,
            summary: ReportSummary::tally(&changes),
            changes,
        }
    }

    /// True when the comparison found any discrepancy
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report to a file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }

    /// Read a report back from a file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
