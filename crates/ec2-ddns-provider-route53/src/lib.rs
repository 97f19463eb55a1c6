// # Route 53 DNS Provider
//
// This crate provides the Route 53 implementation of `DnsProvider` for the
// EC2 DNS reconciler.
//
// ## Behavior
//
// - One API call per trait method, no retries (re-running the event is the
//   retry strategy)
// - Every SDK error is propagated as `Error::Provider` with its full context
// - Dry-run mode performs all reads but only logs the intended write
// - Zone names are always returned fully qualified (trailing dot)
//
// ## API Reference
//
// - GetHostedZone: zone id → zone name
// - ListResourceRecordSets: records at or after (name, type), sorted
// - ChangeResourceRecordSets: UPSERT of a single record set

use async_trait::async_trait;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use ec2_ddns_core::traits::{ChangeInfo, DnsProvider, RecordSet, RecordType};
use ec2_ddns_core::{Error, Result};

const PROVIDER_NAME: &str = "route53";

/// Route 53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform the zone and record lookups
/// - Log the intended change batch
/// - **NOT** submit it
#[derive(Clone)]
pub struct Route53Provider {
    client: aws_sdk_route53::Client,

    /// Dry-run mode: if true, perform reads but skip the change batch
    dry_run: bool,
}

// The SDK client's Debug output is large and carries no useful state
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Route53Provider {
    /// Create a new Route 53 provider
    ///
    /// # Parameters
    ///
    /// - `client`: Configured Route 53 SDK client
    /// - `dry_run`: If true, perform reads but skip writes
    pub fn new(client: aws_sdk_route53::Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Create a provider that submits changes
    pub fn new_live(client: aws_sdk_route53::Client) -> Self {
        Self::new(client, false)
    }

    /// Create a provider that only logs changes
    pub fn new_dry_run(client: aws_sdk_route53::Client) -> Self {
        Self::new(client, true)
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn zone_name(&self, zone_id: &str) -> Result<String> {
        tracing::debug!("Looking up hosted zone: {}", zone_id);

        let output = self
            .client
            .get_hosted_zone()
            .id(zone_id)
            .send()
            .await
            .map_err(|e| sdk_error("GetHostedZone", e))?;

        let zone = output
            .hosted_zone()
            .ok_or_else(|| Error::not_found(format!("Hosted zone not found: {zone_id}")))?;

        Ok(fully_qualified(zone.name()))
    }

    async fn list_records(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: &RecordType,
        max_items: u32,
    ) -> Result<Vec<RecordSet>> {
        tracing::debug!(
            "Listing records in {} from {} (type: {})",
            zone_id,
            start_name,
            start_type
        );

        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(start_name)
            .start_record_type(RrType::from(start_type.as_str()))
            .max_items(i32::try_from(max_items).unwrap_or(i32::MAX))
            .send()
            .await
            .map_err(|e| sdk_error("ListResourceRecordSets", e))?;

        Ok(output
            .resource_record_sets()
            .iter()
            .map(record_from_sdk)
            .collect())
    }

    async fn upsert_record(&self, zone_id: &str, record: &RecordSet) -> Result<ChangeInfo> {
        let change_batch = change_batch_for(record)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would UPSERT in zone {}: {}",
                zone_id,
                serde_json::json!({
                    "name": record.name,
                    "type": record.record_type.as_str(),
                    "ttl": record.ttl,
                    "values": record.values,
                })
            );
            return Ok(ChangeInfo {
                id: "dry-run".to_string(),
                status: "DRY_RUN".to_string(),
            });
        }

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(change_batch)
            .send()
            .await
            .map_err(|e| sdk_error("ChangeResourceRecordSets", e))?;

        let info = output
            .change_info()
            .map(|info| ChangeInfo {
                id: info.id().to_string(),
                status: info.status().as_str().to_string(),
            })
            .unwrap_or_else(|| ChangeInfo {
                id: String::new(),
                status: "UNKNOWN".to_string(),
            });

        tracing::debug!("Change submitted: {} ({})", info.id, info.status);
        Ok(info)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Append the root dot if missing
fn fully_qualified(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

fn sdk_error<E>(operation: &str, err: E) -> Error
where
    E: std::error::Error,
{
    Error::provider(
        PROVIDER_NAME,
        format!("{operation} failed: {}", DisplayErrorContext(&err)),
    )
}

fn build_error(err: aws_sdk_route53::error::BuildError) -> Error {
    Error::provider(PROVIDER_NAME, format!("invalid change batch: {err}"))
}

fn record_from_sdk(set: &ResourceRecordSet) -> RecordSet {
    RecordSet {
        name: set.name().to_string(),
        record_type: RecordType::from_wire(set.r#type().as_str()),
        ttl: set.ttl().and_then(|ttl| u32::try_from(ttl).ok()),
        values: set
            .resource_records()
            .iter()
            .map(|r| r.value().to_string())
            .collect(),
    }
}

fn record_to_sdk(record: &RecordSet) -> Result<ResourceRecordSet> {
    let mut builder = ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::from(record.record_type.as_str()));

    if let Some(ttl) = record.ttl {
        builder = builder.ttl(i64::from(ttl));
    }

    for value in &record.values {
        builder = builder.resource_records(
            ResourceRecord::builder()
                .value(value)
                .build()
                .map_err(build_error)?,
        );
    }

    builder.build().map_err(build_error)
}

fn change_batch_for(record: &RecordSet) -> Result<ChangeBatch> {
    ChangeBatch::builder()
        .changes(
            Change::builder()
                .action(ChangeAction::Upsert)
                .resource_record_set(record_to_sdk(record)?)
                .build()
                .map_err(build_error)?,
        )
        .build()
        .map_err(build_error)
}
