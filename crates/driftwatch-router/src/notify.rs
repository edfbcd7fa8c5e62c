//! Chat notification payloads and delivery
//!
//! Renders the approval-request and deployment-notice messages the
//! workflow posts to an incoming webhook. Parsing the interactive
//! response is the approval service's job, not ours; the button values
//! carry everything it needs to act.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::history::{DeploymentStatus, StoredPlan};

/// Everything the approval service needs to act on a button press
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalPayload {
    pub approve: bool,
    pub id_change: u64,
    pub database_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub ddl: String,
}

impl ApprovalPayload {
    fn for_plan(stored: &StoredPlan, approve: bool) -> Self {
        Self {
            approve,
            id_change: stored.id,
            database_name: stored.plan.table.database.clone(),
            schema_name: stored.plan.table.schema.clone(),
            table_name: stored.plan.table.table.clone(),
            ddl: stored.plan.script(),
        }
    }
}

/// Build the approval-request message for one stored plan
///
/// Yes/No buttons carry the serialized [`ApprovalPayload`]; Yes adds a
/// confirmation dialog since it deploys to production.
pub fn approval_request(stored: &StoredPlan) -> Result<Value, NotifyError> {
    let yes = serde_json::to_string(&ApprovalPayload::for_plan(stored, true))?;
    let no = serde_json::to_string(&ApprovalPayload::for_plan(stored, false))?;

    Ok(json!({
        "text": format!(
            "Having a detected schema change for `{}`\nProposed DDL:```{}```",
            stored.plan.table.fqn(),
            stored.plan.script()
        ),
        "attachments": [
            {
                "pretext": "Would you like to deploy the proposed DDL to production?",
                "fallback": "You are unable to promote a build",
                "callback_id": "get_res",
                "color": "#36a64f",
                "attachment_type": "default",
                "actions": [
                    {
                        "name": "deployment",
                        "text": "Yes",
                        "style": "danger",
                        "type": "button",
                        "value": yes,
                        "confirm": {
                            "title": "Are you sure?",
                            "text": "This will deploy the build to production",
                            "ok_text": "Yes",
                            "dismiss_text": "No"
                        }
                    },
                    {
                        "name": "deployment",
                        "text": "No",
                        "type": "button",
                        "value": no
                    }
                ]
            }
        ]
    }))
}

/// Build the deployment-notice message for one stored plan
pub fn deployment_notice(stored: &StoredPlan, status: DeploymentStatus, footer: &str) -> Value {
    json!({
        "attachments": [
            {
                "color": "#36a64f",
                "pretext": format!(
                    "Having a detected schema change for `{}`",
                    stored.plan.table.fqn()
                ),
                "text": format!(
                    "_Status_: `{}`\n_DDL Statement_:\n```{}```",
                    status,
                    stored.plan.script()
                ),
                "footer": footer
            }
        ]
    })
}

/// Errors raised while building or delivering a notification
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("webhook delivery failed: {0}")]
    Delivery(String),
}

/// Delivery contract for rendered messages
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &Value) -> Result<(), NotifyError>;
}

/// Posts messages to an incoming-webhook URL
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &Value) -> Result<(), NotifyError> {
        debug!(url = %self.url, "posting webhook notification");

        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(())
    }
}
