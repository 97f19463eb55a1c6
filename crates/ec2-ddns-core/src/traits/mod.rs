//! Core traits for the EC2 DNS reconciler
//!
//! This module defines the collaborator interfaces the reconciler consumes.
//!
//! - [`InstanceSource`]: Look up an instance's public IP and tags
//! - [`DnsProvider`]: Read and write records in the managed zone

pub mod instance_source;
pub mod dns_provider;

pub use instance_source::{InstanceSource, InstanceId, InstanceSnapshot, Tag};
pub use dns_provider::{DnsProvider, RecordSet, RecordType, ChangeInfo, RECORD_TTL_SECS};
