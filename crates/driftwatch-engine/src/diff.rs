//! Schema diff: full outer join and change classification
//!
//! Compares the warehouse's registered columns against the normalized
//! incoming columns and classifies every discrepancy. Two independent
//! passes share the same join: a naming pass (add/remove/rename) and a
//! type pass (length overflow, numeric mismatch). One column may
//! legitimately produce a record in each pass; the union is sorted by
//! change type, stable on insertion order.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

use driftwatch_core::{
    change::sort_changes, ChangeRecord, ColumnDescriptor, DriftError, InferredColumnDescriptor,
    InferredType, NormalizedColumn, TableRef, WarehouseType,
};

use crate::normalize::{normalize, to_warehouse_type};

/// Compare two schemas and classify every discrepancy
///
/// `current` is the warehouse truth, `incoming` the file truth. The join
/// key is the warehouse name against the incoming trimmed name. Returns
/// the ordered change list; empty means no drift, which is a valid
/// outcome rather than an error.
///
/// Fails with [`DriftError::InvalidSchema`] on blank names or duplicate
/// join keys; nothing is partially emitted on failure.
pub fn diff(
    current: &[ColumnDescriptor],
    incoming: &[InferredColumnDescriptor],
    table: &TableRef,
    created_at: DateTime<Utc>,
) -> Result<Vec<ChangeRecord>, DriftError> {
    let incoming = normalize(incoming.to_vec());
    validate(current, &incoming)?;

    debug!(
        table = %table.fqn(),
        warehouse_columns = current.len(),
        incoming_columns = incoming.len(),
        "comparing schemas"
    );

    let mut changes = Vec::new();
    let mut matched: Vec<(&ColumnDescriptor, &NormalizedColumn)> = Vec::new();
    let mut seen_incoming: HashSet<&str> = HashSet::new();

    // Naming pass, warehouse order first. Unmatched incoming columns
    // follow in file order, mirroring an outer-join row layout.
    for warehouse_col in current {
        match incoming.iter().find(|n| n.trimmed_name == warehouse_col.name) {
            Some(incoming_col) => {
                seen_incoming.insert(incoming_col.trimmed_name.as_str());
                if incoming_col.column.raw_name != warehouse_col.name {
                    changes.push(ChangeRecord::renamed(
                        table,
                        &warehouse_col.name,
                        &incoming_col.column.raw_name,
                        warehouse_col.declared_type.clone(),
                        warehouse_col.max_length,
                        to_warehouse_type(incoming_col.column.inferred_type),
                        incoming_col.column.observed_max_length,
                        created_at,
                    ));
                }
                matched.push((warehouse_col, incoming_col));
            }
            None => {
                changes.push(ChangeRecord::removed(
                    table,
                    &warehouse_col.name,
                    warehouse_col.declared_type.clone(),
                    warehouse_col.max_length,
                    created_at,
                ));
            }
        }
    }

    for incoming_col in &incoming {
        if !seen_incoming.contains(incoming_col.trimmed_name.as_str()) {
            changes.push(ChangeRecord::added(
                table,
                &incoming_col.column.raw_name,
                to_warehouse_type(incoming_col.column.inferred_type),
                incoming_col.column.observed_max_length,
                created_at,
            ));
        }
    }

    // Type pass over matched pairs only; add/remove leftovers have no
    // other side to compare.
    for (warehouse_col, incoming_col) in matched {
        if let Some(record) = check_type(warehouse_col, incoming_col, table, created_at) {
            changes.push(record);
        }
    }

    sort_changes(&mut changes);

    debug!(table = %table.fqn(), changes = changes.len(), "comparison finished");
    Ok(changes)
}

/// Type-compatibility check for one matched pair
///
/// Text checks only the declared length (an undeclared length never
/// overflows), Number requires integer values, Float requires float
/// values. Other declared types are not compared.
fn check_type(
    warehouse_col: &ColumnDescriptor,
    incoming_col: &NormalizedColumn,
    table: &TableRef,
    created_at: DateTime<Utc>,
) -> Option<ChangeRecord> {
    let observed = &incoming_col.column;
    let incompatible = match &warehouse_col.declared_type {
        WarehouseType::Text => matches!(
            warehouse_col.max_length,
            Some(max) if max < observed.observed_max_length
        ),
        WarehouseType::Number => observed.inferred_type != InferredType::Integer,
        WarehouseType::Float => observed.inferred_type != InferredType::Float,
        WarehouseType::Other(_) => false,
    };

    incompatible.then(|| {
        ChangeRecord::retyped(
            table,
            &warehouse_col.name,
            warehouse_col.declared_type.clone(),
            warehouse_col.max_length,
            to_warehouse_type(observed.inferred_type),
            observed.observed_max_length,
            created_at,
        )
    })
}

fn validate(current: &[ColumnDescriptor], incoming: &[NormalizedColumn]) -> Result<(), DriftError> {
    let mut warehouse_names = HashSet::new();
    for col in current {
        if col.name.trim().is_empty() {
            return Err(DriftError::InvalidSchema(
                "warehouse schema contains a blank column name".into(),
            ));
        }
        if !warehouse_names.insert(col.name.as_str()) {
            return Err(DriftError::InvalidSchema(format!(
                "warehouse schema declares column '{}' twice",
                col.name
            )));
        }
    }

    let mut trimmed_names = HashSet::new();
    for col in incoming {
        if col.column.raw_name.trim().is_empty() {
            return Err(DriftError::InvalidSchema(
                "incoming schema contains a blank column name".into(),
            ));
        }
        if !trimmed_names.insert(col.trimmed_name.as_str()) {
            return Err(DriftError::InvalidSchema(format!(
                "incoming columns collide on trimmed name '{}'",
                col.trimmed_name
            )));
        }
    }

    Ok(())
}
