//! Invocation pipeline
//!
//! One invocation: raw event → [`Event`] → [`normalize`] → [`Reconciler`] →
//! [`InvocationReport`]. The report is what the hosting runtime returns; an
//! aborted reconciliation is reported, not raised.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::event::{Event, Normalized, SkipReason, normalize};
use crate::reconciler::{AbortKind, Outcome, Reconciler};
use crate::traits::InstanceId;

/// Final status of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Skipped,
    NoOp,
    Updated,
    Created,
    Aborted,
}

/// Serializable summary of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationReport {
    pub status: InvocationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<InstanceId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_kind: Option<AbortKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<SkipReason>,
}

impl InvocationReport {
    /// Report for an event that carried no actionable instance
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            status: InvocationStatus::Skipped,
            instance_id: None,
            record_name: None,
            ip: None,
            reason: Some(reason.to_string()),
            abort_kind: None,
            skip: Some(reason),
        }
    }

    /// Report for a completed reconciliation pass
    pub fn from_outcome(instance_id: InstanceId, outcome: &Outcome) -> Self {
        let status = match outcome {
            Outcome::NoOp { .. } => InvocationStatus::NoOp,
            Outcome::Updated { .. } => InvocationStatus::Updated,
            Outcome::Created { .. } => InvocationStatus::Created,
            Outcome::Aborted(_) => InvocationStatus::Aborted,
        };
        let record = outcome.record();
        let abort = outcome.abort_reason();

        Self {
            status,
            instance_id: Some(instance_id),
            record_name: record.map(|r| r.name.clone()),
            ip: record.and_then(|r| r.values.first().cloned()),
            reason: abort.map(|a| a.reason().to_string()),
            abort_kind: abort.map(|a| a.kind()),
            skip: None,
        }
    }
}

/// Handle one raw trigger event end to end
pub async fn handle_event(reconciler: &Reconciler, payload: &serde_json::Value) -> InvocationReport {
    debug!("Received event: {}", payload);

    let event = match Event::from_json(payload) {
        Ok(event) => event,
        Err(e) => {
            info!("Skipping event: {}", e);
            return InvocationReport::skipped(SkipReason::Unrecognized);
        }
    };

    match normalize(&event) {
        Normalized::Skip(reason) => {
            info!("Skipping {} event: {}", event.kind(), reason);
            InvocationReport::skipped(reason)
        }
        Normalized::Reconcile(instance_id) => {
            info!("Processing instance: {} ({} event)", instance_id, event.kind());
            let outcome = reconciler.reconcile(&instance_id).await;
            InvocationReport::from_outcome(instance_id, &outcome)
        }
    }
}
