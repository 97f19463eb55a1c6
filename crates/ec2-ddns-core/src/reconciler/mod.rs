//! Core reconciler
//!
//! The Reconciler is responsible for:
//! - Resolving the managed zone's name
//! - Looking up the instance's public IP and tracking tag
//! - Deriving and validating the desired record name
//! - Comparing desired vs. observed record state
//! - Writing the record only when it is absent or different
//!
//! ## Architecture
//!
//! ```text
//!                    InstanceId
//!                        │
//!                        ▼
//!                ┌──────────────┐
//!                │  Reconciler  │
//!                └──────────────┘
//!                        │
//!         ┌──────────────┴──────────────┐
//!         │                             │
//!         ▼                             ▼
//! ┌────────────────┐           ┌──────────────┐
//! │ InstanceSource │           │ DnsProvider  │
//! │ (describe)     │           │ (zone, list, │
//! └────────────────┘           │  upsert)     │
//!                              └──────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Fetch the zone name
//! 2. Fetch the instance snapshot
//! 3. Require a public IP
//! 4. Require the tracking tag
//! 5. Derive the record name
//! 6. Require the name to be inside the zone
//! 7. List the existing record at that name
//! 8. Same single value → `NoOp`
//! 9. Otherwise upsert → `Updated` or `Created`
//!
//! Every step can abort. Nothing is retried: re-running the same event from
//! step 1 is the retry strategy.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::DnsManagerConfig;
use crate::error::Result;
use crate::naming::{derive_record_name, is_in_zone};
use crate::traits::{DnsProvider, InstanceId, InstanceSource, RecordSet, RecordType};

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record already holds exactly the current IP; nothing was written
    NoOp { record: RecordSet },

    /// A record existed at the name and was overwritten
    Updated {
        record: RecordSet,
        previous_values: Vec<String>,
    },

    /// No record existed at the name; one was created
    Created { record: RecordSet },

    /// The pass stopped early
    Aborted(AbortReason),
}

impl Outcome {
    /// Whether this pass issued a record write
    pub fn wrote(&self) -> bool {
        matches!(self, Outcome::Updated { .. } | Outcome::Created { .. })
    }

    /// The desired record, if the pass got far enough to derive it
    pub fn record(&self) -> Option<&RecordSet> {
        match self {
            Outcome::NoOp { record }
            | Outcome::Updated { record, .. }
            | Outcome::Created { record } => Some(record),
            Outcome::Aborted(_) => None,
        }
    }

    /// The abort reason, if the pass stopped early
    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match self {
            Outcome::Aborted(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Why a reconciliation pass stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The zone lookup call failed
    ZoneLookup(String),
    /// The instance lookup call failed
    InstanceLookup(String),
    /// The instance lookup returned no reservation
    NoReservation,
    /// The instance has no public IP
    NoPublicIp,
    /// The instance carries no tracking tag
    NotTracked,
    /// The derived name is not inside the managed zone
    OutsideZone { name: String, zone: String },
    /// The record list call failed
    RecordList(String),
    /// The record write call failed
    RecordWrite(String),
}

/// Error taxonomy the abort reasons fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortKind {
    /// A lookup or write call failed
    CollaboratorFailure,
    /// The instance is not managed by this system
    NotManaged,
    /// The derived name belongs to another zone
    OutsideZone,
}

impl AbortReason {
    /// Short, stable reason string
    pub fn reason(&self) -> &'static str {
        match self {
            AbortReason::ZoneLookup(_) => "zone lookup failed",
            AbortReason::InstanceLookup(_) | AbortReason::NoReservation => {
                "instance lookup failed"
            }
            AbortReason::NoPublicIp => "no public ip",
            AbortReason::NotTracked => "not tracked",
            AbortReason::OutsideZone { .. } => "outside managed zone",
            AbortReason::RecordList(_) => "record lookup failed",
            AbortReason::RecordWrite(_) => "record write failed",
        }
    }

    /// Which class of failure this is
    pub fn kind(&self) -> AbortKind {
        match self {
            AbortReason::ZoneLookup(_)
            | AbortReason::InstanceLookup(_)
            | AbortReason::NoReservation
            | AbortReason::RecordList(_)
            | AbortReason::RecordWrite(_) => AbortKind::CollaboratorFailure,
            AbortReason::NoPublicIp | AbortReason::NotTracked => AbortKind::NotManaged,
            AbortReason::OutsideZone { .. } => AbortKind::OutsideZone,
        }
    }

    /// Underlying detail, when there is more to say than the reason string
    pub fn detail(&self) -> Option<String> {
        match self {
            AbortReason::ZoneLookup(msg)
            | AbortReason::InstanceLookup(msg)
            | AbortReason::RecordList(msg)
            | AbortReason::RecordWrite(msg) => Some(msg.clone()),
            AbortReason::NoReservation => Some("no reservation found".to_string()),
            AbortReason::OutsideZone { name, zone } => {
                Some(format!("{name} is not in zone {zone}"))
            }
            AbortReason::NoPublicIp | AbortReason::NotTracked => None,
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.reason(), detail),
            None => f.write_str(self.reason()),
        }
    }
}

/// Core reconciler
///
/// Holds the two collaborators and the configuration. A reconciler owns no
/// state between passes, so one instance can serve any number of
/// invocations, concurrently or not.
pub struct Reconciler {
    /// Instance metadata lookups
    instance_source: Box<dyn InstanceSource>,

    /// Zone and record access
    provider: Box<dyn DnsProvider>,

    /// Zone id and naming defaults
    config: DnsManagerConfig,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `instance_source`: Instance lookup implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: Validated reconciler configuration
    pub fn new(
        instance_source: Box<dyn InstanceSource>,
        provider: Box<dyn DnsProvider>,
        config: DnsManagerConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            instance_source,
            provider,
            config,
        })
    }

    /// The configuration this reconciler was built with
    pub fn config(&self) -> &DnsManagerConfig {
        &self.config
    }

    /// Run one reconciliation pass for an instance
    pub async fn reconcile(&self, instance_id: &InstanceId) -> Outcome {
        let span = info_span!("reconcile", instance_id = %instance_id);

        async {
            match self.run_pass(instance_id).await {
                Ok(outcome) => outcome,
                Err(reason) => {
                    warn!("Reconciliation aborted: {}", reason);
                    Outcome::Aborted(reason)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_pass(&self, instance_id: &InstanceId) -> std::result::Result<Outcome, AbortReason> {
        let zone_id = self.config.hosted_zone_id.as_str();

        // Step 1: zone name
        let zone_name = self.provider.zone_name(zone_id).await.map_err(|e| {
            error!("Error getting hosted zone {} from {}: {}", zone_id, self.provider.provider_name(), e);
            AbortReason::ZoneLookup(e.to_string())
        })?;
        debug!("Managed zone: {} ({})", zone_name, zone_id);

        // Step 2: instance snapshot
        let snapshot = self
            .instance_source
            .describe_instance(instance_id)
            .await
            .map_err(|e| {
                error!(
                    "Error describing instance via {}: {}",
                    self.instance_source.source_name(),
                    e
                );
                AbortReason::InstanceLookup(e.to_string())
            })?
            .ok_or(AbortReason::NoReservation)?;

        // Step 3: public IP
        let public_ip = snapshot
            .public_ip
            .as_deref()
            .filter(|ip| !ip.is_empty())
            .ok_or(AbortReason::NoPublicIp)?;

        // Step 4: tracking tag
        let tag = snapshot.tracking_tag().ok_or(AbortReason::NotTracked)?;

        // Step 5: desired name
        let record_name = derive_record_name(
            &tag.value,
            instance_id,
            &zone_name,
            &self.config.default_dns_prefix,
        );
        debug!("Tag value {:?} -> record name {}", tag.value, record_name);

        // Step 6: zone membership
        if !is_in_zone(&record_name, &zone_name) {
            return Err(AbortReason::OutsideZone {
                name: record_name,
                zone: zone_name,
            });
        }

        // Step 7: observed record
        let listed = self
            .provider
            .list_records(zone_id, &record_name, &RecordType::A, 1)
            .await
            .map_err(|e| {
                error!("Error listing record {}: {}", record_name, e);
                AbortReason::RecordList(e.to_string())
            })?;

        let existing = listed
            .into_iter()
            .find(|record| record.is_at(&record_name, &RecordType::A));

        let desired = RecordSet::a(record_name, public_ip);

        // Step 8: idempotency
        if let Some(current) = &existing
            && current.has_single_value(public_ip)
        {
            info!(
                "DNS record {} already points to {}. No update needed.",
                desired.name, public_ip
            );
            return Ok(Outcome::NoOp { record: desired });
        }

        // Step 9: write
        let change = self
            .provider
            .upsert_record(zone_id, &desired)
            .await
            .map_err(|e| {
                error!("Error writing record {}: {}", desired.name, e);
                AbortReason::RecordWrite(e.to_string())
            })?;

        let outcome = match existing {
            Some(previous) => Outcome::Updated {
                record: desired,
                previous_values: previous.values,
            },
            None => Outcome::Created { record: desired },
        };

        info!(
            "{} DNS record {} with IP {} for instance {} (change {} {})",
            if matches!(outcome, Outcome::Updated { .. }) { "Updated" } else { "Created" },
            outcome.record().map(|r| r.name.as_str()).unwrap_or_default(),
            public_ip,
            instance_id,
            change.id,
            change.status
        );

        Ok(outcome)
    }
}
