//! Change-history persistence contract
//!
//! The warehouse owns two bookkeeping tables: one row per classified
//! change, one row per proposed DDL plan with a workflow status. This
//! module defines the store contract and an in-memory implementation;
//! writes for the same plan id must be serialized by the store.
//!
//! Status transitions past the initial assignment (approve, deny,
//! deploy) belong to the surrounding workflow, not to this crate.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use driftwatch_core::ChangeRecord;

use crate::ddl::TablePlan;

/// Workflow status of a DDL plan
///
/// Wire strings match the persisted history format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentStatus {
    #[serde(rename = "requesting approval")]
    RequestingApproval,

    #[serde(rename = "pending approval")]
    PendingApproval,

    #[serde(rename = "pending deployment")]
    PendingDeployment,

    #[serde(rename = "done deployment")]
    DoneDeployment,

    #[serde(rename = "deny deployment")]
    DenyDeployment,
}

impl DeploymentStatus {
    /// Stable wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestingApproval => "requesting approval",
            Self::PendingApproval => "pending approval",
            Self::PendingDeployment => "pending deployment",
            Self::DoneDeployment => "done deployment",
            Self::DenyDeployment => "deny deployment",
        }
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A plan with its store-assigned id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub id: u64,
    pub plan: TablePlan,
}

/// Errors from the history store
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history store failure: {0}")]
    Storage(String),
}

/// Persistence contract for classified changes and DDL plans
#[async_trait::async_trait]
pub trait ChangeHistoryStore: Send + Sync {
    /// Persist one classified change
    async fn record_change(&self, change: &ChangeRecord) -> Result<(), HistoryError>;

    /// Persist one DDL plan, returning its id
    async fn record_plan(&self, plan: &TablePlan) -> Result<u64, HistoryError>;

    /// Plans currently in the given status
    async fn list_plans(&self, status: DeploymentStatus) -> Result<Vec<StoredPlan>, HistoryError>;
}

/// In-memory history store for tests and dry runs
#[derive(Clone, Default)]
pub struct MemoryHistory {
    inner: Arc<RwLock<MemoryHistoryInner>>,
}

#[derive(Default)]
struct MemoryHistoryInner {
    changes: Vec<ChangeRecord>,
    plans: HashMap<u64, StoredPlan>,
    next_id: u64,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded changes, in insertion order
    pub async fn changes(&self) -> Vec<ChangeRecord> {
        self.inner.read().await.changes.clone()
    }

    pub async fn plan_count(&self) -> usize {
        self.inner.read().await.plans.len()
    }
}

#[async_trait::async_trait]
impl ChangeHistoryStore for MemoryHistory {
    async fn record_change(&self, change: &ChangeRecord) -> Result<(), HistoryError> {
        self.inner.write().await.changes.push(change.clone());
        Ok(())
    }

    async fn record_plan(&self, plan: &TablePlan) -> Result<u64, HistoryError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.plans.insert(
            id,
            StoredPlan {
                id,
                plan: plan.clone(),
            },
        );
        Ok(id)
    }

    async fn list_plans(&self, status: DeploymentStatus) -> Result<Vec<StoredPlan>, HistoryError> {
        let inner = self.inner.read().await;
        let mut plans: Vec<StoredPlan> = inner
            .plans
            .values()
            .filter(|p| p.plan.status == status)
            .cloned()
            .collect();
        plans.sort_by_key(|p| p.id);
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use driftwatch_core::{ChangeRecord, TableRef, WarehouseType};

    use crate::ddl::plan_changes;

    fn table() -> TableRef {
        TableRef::new("WORMHOLE", "INGESTION", "EMPLOYEES")
    }

    fn ts() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn status_wire_strings() {
        assert_eq!(DeploymentStatus::RequestingApproval.as_str(), "requesting approval");
        assert_eq!(DeploymentStatus::PendingDeployment.as_str(), "pending deployment");
        let json = serde_json::to_string(&DeploymentStatus::DenyDeployment).unwrap();
        assert_eq!(json, "\"deny deployment\"");
    }

    #[tokio::test]
    async fn records_changes_in_order() {
        let store = MemoryHistory::new();
        let added = ChangeRecord::added(&table(), "email", WarehouseType::Text, 24, ts());
        let removed = ChangeRecord::removed(&table(), "fax", WarehouseType::Text, Some(20), ts());

        store.record_change(&added).await.unwrap();
        store.record_change(&removed).await.unwrap();

        let changes = store.changes().await;
        assert_eq!(changes, vec![added, removed]);
    }

    #[tokio::test]
    async fn assigns_increasing_plan_ids_and_filters_by_status() {
        let store = MemoryHistory::new();

        let auto = plan_changes(&[ChangeRecord::added(&table(), "email", WarehouseType::Text, 24, ts())]);
        let risky = plan_changes(&[ChangeRecord::removed(
            &TableRef::new("WORMHOLE", "INGESTION", "ORDERS"),
            "fax",
            WarehouseType::Text,
            Some(20),
            ts(),
        )]);

        let first = store.record_plan(&auto[0]).await.unwrap();
        let second = store.record_plan(&risky[0]).await.unwrap();
        assert!(second > first);

        let pending = store.list_plans(DeploymentStatus::PendingDeployment).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].plan.table.table, "EMPLOYEES");

        let requesting = store.list_plans(DeploymentStatus::RequestingApproval).await.unwrap();
        assert_eq!(requesting.len(), 1);
        assert_eq!(requesting[0].plan.table.table, "ORDERS");
    }
}
