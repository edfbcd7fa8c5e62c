//! Classified schema changes
//!
//! IMPORTANT: change-type wire names are persisted in the change-history
//! store and rendered into DDL plans. Never rename them - add new ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::column::WarehouseType;
use crate::table::TableRef;

/// The closed set of change classifications
///
/// Variant order is the lexical order of the wire names; result sets sort
/// by it, so reordering variants is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// Column present in the file but not in the warehouse
    AddColumn,

    /// Declared type or length no longer fits the observed values
    ChangedDataType,

    /// Column present in the warehouse but not in the file
    RemoveColumn,

    /// Same column under a punctuation-differing header
    RenameColumn,
}

impl ChangeType {
    /// Stable wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddColumn => "ADD_COLUMN",
            Self::ChangedDataType => "CHANGED_DATA_TYPE",
            Self::RemoveColumn => "REMOVE_COLUMN",
            Self::RenameColumn => "RENAME_COLUMN",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classified discrepancy between the warehouse and an incoming file
///
/// Produced exclusively by the diff engine and immutable afterwards. The
/// constructors below are the only way to build one, so every record
/// satisfies exactly one of:
///
/// - `AddColumn`: `original_column_name` is `None`, `new_column_name` set
/// - `RemoveColumn`: `new_column_name` is `None`, `original_column_name` set
/// - `RenameColumn`: both set and differing
/// - `ChangedDataType`: both set and equal
///
/// Absent lengths are carried as 0, matching the persisted history format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub database: String,
    pub table_schema: String,
    pub table_name: String,

    /// Warehouse-side column name, absent for additions
    pub original_column_name: Option<String>,

    /// File-side column name, absent for removals
    pub new_column_name: Option<String>,

    /// Declared warehouse type, absent for additions
    pub old_type: Option<WarehouseType>,

    /// Declared maximum length, 0 when absent
    pub old_length: u32,

    /// Observed type mapped into warehouse vocabulary, absent for removals
    pub new_type: Option<WarehouseType>,

    /// Observed maximum length, 0 when absent
    pub new_length: u32,

    pub change_type: ChangeType,

    pub created_at: DateTime<Utc>,
}

impl ChangeRecord {
    /// A column the warehouse does not have yet
    pub fn added(
        table: &TableRef,
        new_name: impl Into<String>,
        new_type: WarehouseType,
        new_length: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            database: table.database.clone(),
            table_schema: table.schema.clone(),
            table_name: table.table.clone(),
            original_column_name: None,
            new_column_name: Some(new_name.into()),
            old_type: None,
            old_length: 0,
            new_type: Some(new_type),
            new_length,
            change_type: ChangeType::AddColumn,
            created_at,
        }
    }

    /// A column the incoming file no longer carries
    pub fn removed(
        table: &TableRef,
        original_name: impl Into<String>,
        old_type: WarehouseType,
        old_length: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            database: table.database.clone(),
            table_schema: table.schema.clone(),
            table_name: table.table.clone(),
            original_column_name: Some(original_name.into()),
            new_column_name: None,
            old_type: Some(old_type),
            old_length: old_length.unwrap_or(0),
            new_type: None,
            new_length: 0,
            change_type: ChangeType::RemoveColumn,
            created_at,
        }
    }

    /// The same logical column under a differing header
    #[allow(clippy::too_many_arguments)]
    pub fn renamed(
        table: &TableRef,
        original_name: impl Into<String>,
        new_name: impl Into<String>,
        old_type: WarehouseType,
        old_length: Option<u32>,
        new_type: WarehouseType,
        new_length: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            database: table.database.clone(),
            table_schema: table.schema.clone(),
            table_name: table.table.clone(),
            original_column_name: Some(original_name.into()),
            new_column_name: Some(new_name.into()),
            old_type: Some(old_type),
            old_length: old_length.unwrap_or(0),
            new_type: Some(new_type),
            new_length,
            change_type: ChangeType::RenameColumn,
            created_at,
        }
    }

    /// Observed values no longer fit the declared type or length
    ///
    /// Both name fields carry the warehouse declared name; a concurrent
    /// rename is reported by its own record.
    pub fn retyped(
        table: &TableRef,
        column_name: impl Into<String>,
        old_type: WarehouseType,
        old_length: Option<u32>,
        new_type: WarehouseType,
        new_length: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        let name = column_name.into();
        Self {
            database: table.database.clone(),
            table_schema: table.schema.clone(),
            table_name: table.table.clone(),
            original_column_name: Some(name.clone()),
            new_column_name: Some(name),
            old_type: Some(old_type),
            old_length: old_length.unwrap_or(0),
            new_type: Some(new_type),
            new_length,
            change_type: ChangeType::ChangedDataType,
            created_at,
        }
    }

    /// Table the record belongs to
    pub fn table(&self) -> TableRef {
        TableRef::new(&self.database, &self.table_schema, &self.table_name)
    }
}

/// Sort a result set into its contractual order
///
/// Ascending by change type, stable on insertion order for ties.
pub fn sort_changes(changes: &mut [ChangeRecord]) {
    changes.sort_by_key(|c| c.change_type);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::WarehouseType;

    fn table() -> TableRef {
        TableRef::new("WORMHOLE", "INGESTION", "EMPLOYEES")
    }

    fn ts() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn wire_names_are_stable() {
        assert_eq!(ChangeType::AddColumn.as_str(), "ADD_COLUMN");
        assert_eq!(ChangeType::ChangedDataType.as_str(), "CHANGED_DATA_TYPE");
        assert_eq!(ChangeType::RemoveColumn.as_str(), "REMOVE_COLUMN");
        assert_eq!(ChangeType::RenameColumn.as_str(), "RENAME_COLUMN");
    }

    #[test]
    fn variant_order_matches_lexical_wire_order() {
        let mut types = vec![
            ChangeType::RenameColumn,
            ChangeType::AddColumn,
            ChangeType::RemoveColumn,
            ChangeType::ChangedDataType,
        ];
        types.sort();
        let names: Vec<_> = types.iter().map(|t| t.as_str()).collect();
        let mut lexical = names.clone();
        lexical.sort();
        assert_eq!(names, lexical);
    }

    #[test]
    fn constructors_enforce_name_invariant() {
        let added = ChangeRecord::added(&table(), "email", WarehouseType::Text, 24, ts());
        assert!(added.original_column_name.is_none());
        assert_eq!(added.new_column_name.as_deref(), Some("email"));
        assert_eq!(added.old_length, 0);

        let removed = ChangeRecord::removed(&table(), "email", WarehouseType::Text, Some(50), ts());
        assert!(removed.new_column_name.is_none());
        assert_eq!(removed.old_length, 50);
        assert_eq!(removed.new_length, 0);

        let renamed = ChangeRecord::renamed(
            &table(),
            "userid",
            "user_id",
            WarehouseType::Number,
            None,
            WarehouseType::Number,
            6,
            ts(),
        );
        assert_ne!(renamed.original_column_name, renamed.new_column_name);

        let retyped = ChangeRecord::retyped(
            &table(),
            "notes",
            WarehouseType::Text,
            Some(50),
            WarehouseType::Text,
            80,
            ts(),
        );
        assert_eq!(retyped.original_column_name, retyped.new_column_name);
    }

    #[test]
    fn sort_is_stable_within_change_type() {
        let mut changes = vec![
            ChangeRecord::renamed(
                &table(),
                "userid",
                "user_id",
                WarehouseType::Number,
                None,
                WarehouseType::Number,
                6,
                ts(),
            ),
            ChangeRecord::added(&table(), "b", WarehouseType::Text, 1, ts()),
            ChangeRecord::added(&table(), "a", WarehouseType::Text, 1, ts()),
        ];
        sort_changes(&mut changes);

        assert_eq!(changes[0].new_column_name.as_deref(), Some("b"));
        assert_eq!(changes[1].new_column_name.as_deref(), Some("a"));
        assert_eq!(changes[2].change_type, ChangeType::RenameColumn);
    }

    #[test]
    fn serializes_screaming_change_type() {
        let record = ChangeRecord::added(&table(), "email", WarehouseType::Text, 24, ts());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"ADD_COLUMN\""));
    }
}
