//! Trigger events and the event normalizer
//!
//! Three event shapes can trigger a reconciliation. They arrive as
//! EventBridge envelopes discriminated by their `detail-type` field:
//!
//! | `detail-type`                              | Variant          |
//! |--------------------------------------------|------------------|
//! | `EC2 Instance State-change Notification`   | `StateChange`    |
//! | `EC2 Instance Launch Successful`           | `LaunchSuccess`  |
//! | `Tag Change on Resource`                   | `TagChange`      |
//!
//! [`normalize`] maps an [`Event`] to the instance that needs reconciling,
//! or to a [`SkipReason`]. It is a pure function of the payload.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::traits::InstanceId;

/// Instance state that makes a state-change event actionable
pub const RUNNING_STATE: &str = "running";

/// Resource type that makes a tag-change event actionable
pub const INSTANCE_RESOURCE_TYPE: &str = "instance";

/// A trigger event, decoded from its envelope
///
/// Fields are optional so that a recognized shape with a missing field still
/// decodes and is skipped by [`normalize`] rather than rejected outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Instance changed lifecycle state
    StateChange {
        instance_id: Option<String>,
        state: Option<String>,
    },

    /// Instance launched successfully
    LaunchSuccess { instance_id: Option<String> },

    /// Tags changed on some resource
    TagChange {
        resource_type: Option<String>,
        resource_arn: Option<String>,
    },
}

impl Event {
    /// Decode an event from its JSON envelope
    ///
    /// Returns `Error::Event` when the payload matches none of the three
    /// shapes.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let envelope = Envelope::deserialize(value)
            .map_err(|e| Error::event(format!("unrecognized event shape: {e}")))?;
        Ok(envelope.into())
    }

    /// Short name of the variant (for logging)
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StateChange { .. } => "state-change",
            Event::LaunchSuccess { .. } => "launch-success",
            Event::TagChange { .. } => "tag-change",
        }
    }
}

/// Why an event carries no actionable instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// State-change event for a state other than `running`
    NotRunning { state: Option<String> },
    /// Tag-change event on something other than an instance
    NotAnInstance { resource_type: Option<String> },
    /// The instance-identifying field is missing or empty
    MissingInstanceId,
    /// The payload matched none of the known shapes
    Unrecognized,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotRunning { state } => write!(
                f,
                "instance is not running (state: {})",
                state.as_deref().unwrap_or("<missing>")
            ),
            SkipReason::NotAnInstance { resource_type } => write!(
                f,
                "tag change is not on an instance (resource type: {})",
                resource_type.as_deref().unwrap_or("<missing>")
            ),
            SkipReason::MissingInstanceId => f.write_str("could not extract instance id from event"),
            SkipReason::Unrecognized => f.write_str("unrecognized event"),
        }
    }
}

/// Result of normalizing an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// This instance needs reconciliation
    Reconcile(InstanceId),
    /// Nothing to do
    Skip(SkipReason),
}

/// Map an event to the instance that needs reconciliation
pub fn normalize(event: &Event) -> Normalized {
    match event {
        Event::StateChange { instance_id, state } => {
            if state.as_deref() != Some(RUNNING_STATE) {
                return Normalized::Skip(SkipReason::NotRunning {
                    state: state.clone(),
                });
            }
            instance_id_from(instance_id.as_deref())
        }
        Event::LaunchSuccess { instance_id } => instance_id_from(instance_id.as_deref()),
        Event::TagChange {
            resource_type,
            resource_arn,
        } => {
            if resource_type.as_deref() != Some(INSTANCE_RESOURCE_TYPE) {
                return Normalized::Skip(SkipReason::NotAnInstance {
                    resource_type: resource_type.clone(),
                });
            }
            instance_id_from(resource_arn.as_deref().map(last_path_segment))
        }
    }
}

/// The trailing `/`-delimited segment of a resource reference
///
/// `arn:aws:ec2:us-east-1:123456789012:instance/i-0abc` → `i-0abc`
pub fn last_path_segment(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

fn instance_id_from(candidate: Option<&str>) -> Normalized {
    match candidate {
        Some(id) if !id.is_empty() => Normalized::Reconcile(InstanceId::new(id)),
        _ => Normalized::Skip(SkipReason::MissingInstanceId),
    }
}

// Wire shapes. Unknown fields are ignored; missing `detail` decodes as empty.

#[derive(Debug, Deserialize)]
#[serde(tag = "detail-type")]
enum Envelope {
    #[serde(rename = "EC2 Instance State-change Notification")]
    StateChange {
        #[serde(default)]
        detail: InstanceDetail,
    },

    #[serde(rename = "EC2 Instance Launch Successful")]
    LaunchSuccess {
        #[serde(default)]
        detail: InstanceDetail,
    },

    #[serde(rename = "Tag Change on Resource")]
    TagChange {
        #[serde(default)]
        detail: TagChangeDetail,
        #[serde(default)]
        resources: Vec<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct InstanceDetail {
    // Auto Scaling launch notifications carry the id as `EC2InstanceId`
    #[serde(rename = "instance-id", alias = "EC2InstanceId", default)]
    instance_id: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TagChangeDetail {
    #[serde(rename = "resource-type", default)]
    resource_type: Option<String>,
}

impl From<Envelope> for Event {
    fn from(envelope: Envelope) -> Self {
        match envelope {
            Envelope::StateChange { detail } => Event::StateChange {
                instance_id: detail.instance_id,
                state: detail.state,
            },
            Envelope::LaunchSuccess { detail } => Event::LaunchSuccess {
                instance_id: detail.instance_id,
            },
            Envelope::TagChange { detail, resources } => Event::TagChange {
                resource_type: detail.resource_type,
                resource_arn: resources.into_iter().next(),
            },
        }
    }
}
