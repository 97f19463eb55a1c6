// # Instance Source Trait
//
// Defines the interface for looking up the current state of a compute
// instance: its public IP and its tags.
//
// ## Implementations
//
// - EC2 DescribeInstances: `ec2-ddns-instance-ec2` crate
//
// ## Usage
//
// ```rust,ignore
// use ec2_ddns_core::{InstanceId, InstanceSource};
//
// async fn lookup(source: &dyn InstanceSource) -> ec2_ddns_core::Result<()> {
//     let id = InstanceId::new("i-0123456789abcdef0");
//     match source.describe_instance(&id).await? {
//         Some(snapshot) => println!("public ip: {:?}", snapshot.public_ip),
//         None => println!("no reservation found"),
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::naming::TRACKING_TAG_KEY;

/// Opaque identifier of a compute instance (e.g. "i-0123456789abcdef0")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wrap an instance identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single key/value tag attached to an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Point-in-time view of an instance, fetched fresh for every invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    /// Current public IPv4 address, if the instance has one
    pub public_ip: Option<String>,
    /// Tags in the order the instance source returned them
    pub tags: Vec<Tag>,
}

impl InstanceSnapshot {
    /// Create a snapshot
    pub fn new(public_ip: Option<String>, tags: Vec<Tag>) -> Self {
        Self { public_ip, tags }
    }

    /// The tracking tag, matched case-insensitively on its key
    ///
    /// When several tags match, the first one encountered wins.
    pub fn tracking_tag(&self) -> Option<&Tag> {
        self.tags
            .iter()
            .find(|tag| tag.key.eq_ignore_ascii_case(TRACKING_TAG_KEY))
    }
}

/// Trait for instance metadata lookups
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Constraints
///
/// - One lookup per call; no retries, no caching between calls
/// - No decisions about DNS; that belongs to the `Reconciler`
#[async_trait]
pub trait InstanceSource: Send + Sync {
    /// Describe a single instance
    ///
    /// # Returns
    ///
    /// - `Ok(Some(InstanceSnapshot))`: The instance's current state
    /// - `Ok(None)`: No reservation was found for this id
    /// - `Err(Error)`: The lookup failed (unknown id, access error, ...)
    async fn describe_instance(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Option<InstanceSnapshot>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
