// # EC2 Instance Source
//
// This crate provides the `InstanceSource` implementation backed by the EC2
// DescribeInstances API.
//
// ## Architecture
//
// One DescribeInstances call per lookup, filtered to a single instance id.
// The first instance of the first reservation is used. An empty response
// is reported as "no such instance" (`Ok(None)`) rather than as an error so
// the reconciler can tell it apart from a failed call.

use async_trait::async_trait;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::Reservation;
use ec2_ddns_core::traits::{InstanceId, InstanceSnapshot, InstanceSource, Tag};
use ec2_ddns_core::{Error, Result};

/// Instance source backed by EC2
#[derive(Debug, Clone)]
pub struct Ec2InstanceSource {
    client: aws_sdk_ec2::Client,
}

impl Ec2InstanceSource {
    /// Create a new EC2 instance source
    pub fn new(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InstanceSource for Ec2InstanceSource {
    async fn describe_instance(&self, instance_id: &InstanceId) -> Result<Option<InstanceSnapshot>> {
        tracing::debug!("Describing instance: {}", instance_id);

        let output = self
            .client
            .describe_instances()
            .instance_ids(instance_id.as_str())
            .send()
            .await
            .map_err(|e| {
                Error::instance_source(format!(
                    "DescribeInstances failed for {}: {}",
                    instance_id,
                    DisplayErrorContext(&e)
                ))
            })?;

        let snapshot = snapshot_from_reservations(output.reservations());
        if snapshot.is_none() {
            tracing::debug!("No reservation returned for {}", instance_id);
        }
        Ok(snapshot)
    }

    fn source_name(&self) -> &'static str {
        "ec2"
    }
}

/// Extract the snapshot of the first instance in the first reservation
///
/// Tags missing a key are dropped; a missing value is treated as empty.
pub fn snapshot_from_reservations(reservations: &[Reservation]) -> Option<InstanceSnapshot> {
    let instance = reservations.first()?.instances().first()?;

    let tags = instance
        .tags()
        .iter()
        .filter_map(|tag| {
            tag.key()
                .map(|key| Tag::new(key, tag.value().unwrap_or_default()))
        })
        .collect();

    Some(InstanceSnapshot::new(
        instance.public_ip_address().map(str::to_string),
        tags,
    ))
}
