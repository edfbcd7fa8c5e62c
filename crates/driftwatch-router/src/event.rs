//! Events emitted between pipeline stages
//!
//! Stages hand work to each other through an explicit sink (a queue in
//! production, memory in tests) instead of invoking each other directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use driftwatch_core::TableRef;

use crate::history::DeploymentStatus;

/// What the router tells downstream stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RouterEvent {
    /// Drift was detected; plans follow
    ChangesDetected { table: TableRef, total: usize },

    /// A plan was persisted under the given id and initial status
    PlanRecorded {
        id: u64,
        table: TableRef,
        status: DeploymentStatus,
    },

    /// No drift: the file can load through the normal ingestion path
    LoadRequested { table: TableRef },
}

/// Errors from event publication
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("failed to publish event: {0}")]
    Publish(String),
}

/// Downstream hand-off contract
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: RouterEvent) -> Result<(), EventError>;
}

/// In-memory sink for tests and dry runs
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<RwLock<Vec<RouterEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order
    pub async fn events(&self) -> Vec<RouterEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait::async_trait]
impl EventSink for MemorySink {
    async fn publish(&self, event: RouterEvent) -> Result<(), EventError> {
        self.events.write().await.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_preserves_order() {
        let sink = MemorySink::new();
        let table = TableRef::new("WORMHOLE", "INGESTION", "EMPLOYEES");

        sink.publish(RouterEvent::ChangesDetected {
            table: table.clone(),
            total: 2,
        })
        .await
        .unwrap();
        sink.publish(RouterEvent::LoadRequested { table: table.clone() })
            .await
            .unwrap();

        let events = sink.events().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], RouterEvent::ChangesDetected { total: 2, .. }));
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let event = RouterEvent::LoadRequested {
            table: TableRef::new("WORMHOLE", "INGESTION", "EMPLOYEES"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"load_requested\""));
    }
}
