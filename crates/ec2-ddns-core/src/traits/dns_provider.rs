// # DNS Provider Trait
//
// Defines the interface for reading and writing records in the managed
// hosted zone.
//
// ## Implementations
//
// - Route 53: `ec2-ddns-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use ec2_ddns_core::{DnsProvider, RecordSet};
//
// async fn publish(provider: &dyn DnsProvider) -> ec2_ddns_core::Result<()> {
//     let zone = provider.zone_name("Z0123456789ABC").await?;
//     let record = RecordSet::a(format!("host1.{zone}"), "203.0.113.10");
//     provider.upsert_record("Z0123456789ABC", &record).await?;
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// TTL applied to every record this system writes
pub const RECORD_TTL_SECS: u32 = 300;

/// DNS record type
///
/// Only `A` is ever written; the other variants exist so that whatever the
/// list call returns can be represented and compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
    /// CNAME record
    Cname,
    /// Anything else, by its wire name
    Other(String),
}

impl RecordType {
    /// Wire name of the record type ("A", "AAAA", ...)
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Other(name) => name,
        }
    }

    /// Parse a wire name
    pub fn from_wire(name: &str) -> Self {
        match name {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record set as seen by or written to the DNS provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Fully-qualified name, trailing dot included
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Time-to-live in seconds (alias records carry none)
    pub ttl: Option<u32>,
    /// Record values
    pub values: Vec<String>,
}

impl RecordSet {
    /// The single-valued address record this system writes
    pub fn a(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::A,
            ttl: Some(RECORD_TTL_SECS),
            values: vec![ip.into()],
        }
    }

    /// Whether this record set lives at `name` with type `record_type`
    pub fn is_at(&self, name: &str, record_type: &RecordType) -> bool {
        self.name == name && &self.record_type == record_type
    }

    /// Whether the record holds exactly one value equal to `value`
    pub fn has_single_value(&self, value: &str) -> bool {
        matches!(self.values.as_slice(), [only] if only == value)
    }
}

/// Confirmation returned by a successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// Provider-assigned change id
    pub id: String,
    /// Provider-reported status (e.g. "PENDING", "INSYNC")
    pub status: String,
}

/// Trait for DNS provider implementations
///
/// This trait defines the three calls the reconciler makes against the
/// managed zone. Implementations must handle the specifics of each
/// provider's API.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Constraints
///
/// Providers are isolated and single-shot:
/// - One API call per method invocation
/// - No retry logic or backoff; return the error and let the next
///   triggering event retry from scratch
/// - No caching beyond a single request
/// - No decision about whether a write is needed (owned by `Reconciler`)
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the fully-qualified, trailing-dot name of a hosted zone
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The zone name, e.g. "example.com."
    /// - `Err(Error)`: Invalid zone id or access error
    async fn zone_name(&self, zone_id: &str) -> Result<String, crate::Error>;

    /// List record sets starting at the given name and type
    ///
    /// Returns at most `max_items` record sets in the provider's order,
    /// starting at `start_name`/`start_type`. The first record returned is
    /// not necessarily at `start_name`; callers must compare.
    async fn list_records(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: &RecordType,
        max_items: u32,
    ) -> Result<Vec<RecordSet>, crate::Error>;

    /// Create or replace a record set
    ///
    /// # Idempotency
    ///
    /// Writing the same record set twice leaves the zone in the same state.
    async fn upsert_record(
        &self,
        zone_id: &str,
        record: &RecordSet,
    ) -> Result<ChangeInfo, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
