//! DDL synthesis and approval classification
//!
//! One ALTER statement per change record, grouped into per-table plans.
//! Additive changes deploy automatically; anything destructive or
//! type-affecting needs a human to say yes.

use driftwatch_core::{ChangeRecord, ChangeType, TableRef, WarehouseType};

use crate::history::DeploymentStatus;

/// A table's worth of proposed DDL
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TablePlan {
    pub table: TableRef,

    /// One ALTER statement per change, in record order
    pub statements: Vec<String>,

    /// Human-readable one-liners, parallel to `statements`
    pub changes: Vec<String>,

    /// True when any change in the plan needs approval
    pub requires_approval: bool,

    /// Initial workflow status derived from `requires_approval`
    pub status: DeploymentStatus,
}

impl TablePlan {
    /// The statements as one executable script
    pub fn script(&self) -> String {
        let mut script = String::new();
        for statement in &self.statements {
            script.push_str(statement);
            script.push_str(";\n");
        }
        script
    }
}

/// Whether a change type may deploy without a human decision
pub fn requires_approval(change_type: ChangeType) -> bool {
    match change_type {
        ChangeType::AddColumn => false,
        ChangeType::ChangedDataType | ChangeType::RemoveColumn | ChangeType::RenameColumn => true,
    }
}

/// Render the corrective ALTER statement for one record
pub fn ddl_statement(record: &ChangeRecord) -> String {
    let table = record.table().fqn();
    match record.change_type {
        ChangeType::AddColumn => format!(
            "alter table {} add column {} {}",
            table,
            new_name(record),
            type_name(&record.new_type)
        ),
        ChangeType::ChangedDataType => format!(
            "alter table {} alter column {} {}({})",
            table,
            original_name(record),
            type_name(&record.new_type),
            record.new_length
        ),
        ChangeType::RemoveColumn => {
            format!("alter table {} drop column {}", table, original_name(record))
        }
        ChangeType::RenameColumn => format!(
            "alter table {} rename column {} to {}",
            table,
            original_name(record),
            new_name(record)
        ),
    }
}

/// Render the notification one-liner for one record
pub fn change_summary(record: &ChangeRecord) -> String {
    match record.change_type {
        ChangeType::AddColumn => format!("{} is added", new_name(record)),
        ChangeType::ChangedDataType => format!(
            "{} is changed datatype from {}({}) to {}({})",
            original_name(record),
            type_name(&record.old_type),
            record.old_length,
            type_name(&record.new_type),
            record.new_length
        ),
        ChangeType::RemoveColumn => format!("{} is removed", original_name(record)),
        ChangeType::RenameColumn => {
            format!("{} is renamed to {}", original_name(record), new_name(record))
        }
    }
}

/// Group a change list into per-table plans
///
/// Table order follows first appearance; record order is preserved
/// within each plan.
pub fn plan_changes(changes: &[ChangeRecord]) -> Vec<TablePlan> {
    let mut plans: Vec<TablePlan> = Vec::new();

    for record in changes {
        let table = record.table();
        let idx = match plans.iter().position(|p| p.table == table) {
            Some(idx) => idx,
            None => {
                plans.push(TablePlan {
                    table,
                    statements: Vec::new(),
                    changes: Vec::new(),
                    requires_approval: false,
                    status: DeploymentStatus::PendingDeployment,
                });
                plans.len() - 1
            }
        };
        let plan = &mut plans[idx];

        plan.statements.push(ddl_statement(record));
        plan.changes.push(change_summary(record));
        if requires_approval(record.change_type) {
            plan.requires_approval = true;
            plan.status = DeploymentStatus::RequestingApproval;
        }
    }

    plans
}

// ChangeRecord constructors guarantee the names each change type
// promises; the blank fallback keeps rendering total.
fn original_name(record: &ChangeRecord) -> &str {
    record.original_column_name.as_deref().unwrap_or_default()
}

fn new_name(record: &ChangeRecord) -> &str {
    record.new_column_name.as_deref().unwrap_or_default()
}

fn type_name(t: &Option<WarehouseType>) -> String {
    t.as_ref().map(|t| t.to_string()).unwrap_or_default()
}
