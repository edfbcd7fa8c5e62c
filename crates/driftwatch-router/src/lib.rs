//! Driftwatch router - from classified changes to an actionable workflow
//!
//! Consumes a [`DriftReport`], persists each change, synthesizes DDL
//! plans, classifies them for auto-deploy or approval, and hands the
//! results downstream through an event sink. ChangeRecords are never
//! mutated here.

pub mod ddl;
pub mod event;
pub mod history;
pub mod notify;

pub use ddl::{change_summary, ddl_statement, plan_changes, requires_approval, TablePlan};
pub use event::{EventError, EventSink, MemorySink, RouterEvent};
pub use history::{ChangeHistoryStore, DeploymentStatus, HistoryError, MemoryHistory, StoredPlan};
pub use notify::{approval_request, deployment_notice, Notifier, NotifyError, WebhookNotifier};

use tracing::info;

use driftwatch_core::DriftReport;

/// Errors raised while routing a report
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Event(#[from] EventError),
}

/// Drives one report through persistence, planning, and hand-off
pub struct Router<H, S> {
    history: H,
    sink: S,
}

impl<H, S> Router<H, S>
where
    H: ChangeHistoryStore,
    S: EventSink,
{
    pub fn new(history: H, sink: S) -> Self {
        Self { history, sink }
    }

    /// Route one drift report
    ///
    /// An empty report requests normal data loading and produces no
    /// plans. Otherwise every change is persisted, plans are built per
    /// table and recorded with their initial status, and a
    /// [`RouterEvent::PlanRecorded`] is published per plan.
    pub async fn route(&self, report: &DriftReport) -> Result<Vec<StoredPlan>, RouterError> {
        if !report.has_changes() {
            info!(table = %report.table.fqn(), "no drift, requesting data load");
            self.sink
                .publish(RouterEvent::LoadRequested {
                    table: report.table.clone(),
                })
                .await?;
            return Ok(Vec::new());
        }

        info!(
            table = %report.table.fqn(),
            changes = report.changes.len(),
            "routing detected changes"
        );
        self.sink
            .publish(RouterEvent::ChangesDetected {
                table: report.table.clone(),
                total: report.changes.len(),
            })
            .await?;

        for change in &report.changes {
            self.history.record_change(change).await?;
        }

        let mut stored = Vec::new();
        for plan in plan_changes(&report.changes) {
            let id = self.history.record_plan(&plan).await?;
            self.sink
                .publish(RouterEvent::PlanRecorded {
                    id,
                    table: plan.table.clone(),
                    status: plan.status,
                })
                .await?;
            stored.push(StoredPlan { id, plan });
        }

        Ok(stored)
    }
}
