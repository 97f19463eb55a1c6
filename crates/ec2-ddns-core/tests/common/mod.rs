//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles count every collaborator call and can be told to fail, so
//! tests can assert not only on the outcome but on which calls were (not)
//! made.

#![allow(dead_code)]

use ec2_ddns_core::error::{Error, Result};
use ec2_ddns_core::traits::{
    ChangeInfo, DnsProvider, InstanceId, InstanceSnapshot, InstanceSource, RecordSet, RecordType,
    Tag,
};
use ec2_ddns_core::{DnsManagerConfig, Reconciler};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ZONE_ID: &str = "Z0123456789ABC";
pub const ZONE_NAME: &str = "example.com.";
pub const INSTANCE_ID: &str = "i-123";
pub const PUBLIC_IP: &str = "203.0.113.10";

/// In-memory zone that behaves like a sorted record listing
///
/// Clones share counters and records, so a test can keep one handle while
/// the reconciler owns another.
#[derive(Clone)]
pub struct MockDnsProvider {
    zone_name: String,
    records: Arc<Mutex<Vec<RecordSet>>>,
    zone_calls: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
    upsert_calls: Arc<AtomicUsize>,
    written: Arc<Mutex<Vec<RecordSet>>>,
    fail_zone: bool,
    fail_list: bool,
    fail_upsert: bool,
}

impl MockDnsProvider {
    pub fn new(zone_name: &str) -> Self {
        Self {
            zone_name: zone_name.to_string(),
            records: Arc::new(Mutex::new(Vec::new())),
            zone_calls: Arc::new(AtomicUsize::new(0)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            upsert_calls: Arc::new(AtomicUsize::new(0)),
            written: Arc::new(Mutex::new(Vec::new())),
            fail_zone: false,
            fail_list: false,
            fail_upsert: false,
        }
    }

    /// Seed an existing record
    pub fn with_record(self, record: RecordSet) -> Self {
        self.store(record);
        self
    }

    pub fn failing_zone_lookup(mut self) -> Self {
        self.fail_zone = true;
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_upsert(mut self) -> Self {
        self.fail_upsert = true;
        self
    }

    pub fn zone_calls(&self) -> usize {
        self.zone_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Every record set passed to a successful upsert, in order
    pub fn written(&self) -> Vec<RecordSet> {
        self.written.lock().unwrap().clone()
    }

    /// Current record at a name and type
    pub fn record_at(&self, name: &str, record_type: &RecordType) -> Option<RecordSet> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.is_at(name, record_type))
            .cloned()
    }

    fn store(&self, record: RecordSet) {
        let mut records = self.records.lock().unwrap();
        records.retain(|r| !r.is_at(&record.name, &record.record_type));
        records.push(record);
        records.sort_by(|a, b| {
            (a.name.as_str(), a.record_type.as_str()).cmp(&(b.name.as_str(), b.record_type.as_str()))
        });
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn zone_name(&self, _zone_id: &str) -> Result<String> {
        self.zone_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_zone {
            return Err(Error::provider("mock", "NoSuchHostedZone"));
        }
        Ok(self.zone_name.clone())
    }

    async fn list_records(
        &self,
        _zone_id: &str,
        start_name: &str,
        start_type: &RecordType,
        max_items: u32,
    ) -> Result<Vec<RecordSet>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(Error::provider("mock", "Throttling"));
        }

        let start = (start_name, start_type.as_str());
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| (r.name.as_str(), r.record_type.as_str()) >= start)
            .take(max_items as usize)
            .cloned()
            .collect())
    }

    async fn upsert_record(&self, _zone_id: &str, record: &RecordSet) -> Result<ChangeInfo> {
        let n = self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert {
            return Err(Error::provider("mock", "InvalidChangeBatch"));
        }

        self.written.lock().unwrap().push(record.clone());
        self.store(record.clone());

        Ok(ChangeInfo {
            id: format!("/change/C{n}"),
            status: "PENDING".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Instance lookups served from a map; unknown ids have no reservation
#[derive(Clone)]
pub struct MockInstanceSource {
    instances: Arc<Mutex<HashMap<String, InstanceSnapshot>>>,
    describe_calls: Arc<AtomicUsize>,
    fail: bool,
}

impl MockInstanceSource {
    pub fn new() -> Self {
        Self {
            instances: Arc::new(Mutex::new(HashMap::new())),
            describe_calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn with_instance(self, id: &str, snapshot: InstanceSnapshot) -> Self {
        self.set_instance(id, snapshot);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Replace an instance's snapshot (e.g. after an IP change)
    pub fn set_instance(&self, id: &str, snapshot: InstanceSnapshot) {
        self.instances
            .lock()
            .unwrap()
            .insert(id.to_string(), snapshot);
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InstanceSource for MockInstanceSource {
    async fn describe_instance(&self, instance_id: &InstanceId) -> Result<Option<InstanceSnapshot>> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::instance_source("InvalidInstanceID.NotFound"));
        }
        Ok(self
            .instances
            .lock()
            .unwrap()
            .get(instance_id.as_str())
            .cloned())
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}

/// A snapshot with a public IP and a tracking tag
pub fn tracked(ip: &str, tag_value: &str) -> InstanceSnapshot {
    InstanceSnapshot::new(
        Some(ip.to_string()),
        vec![Tag::new("Name", "web"), Tag::new("IP_Tracking", tag_value)],
    )
}

/// Minimal configuration for tests
pub fn test_config() -> DnsManagerConfig {
    DnsManagerConfig::new(ZONE_ID)
}

/// Build a reconciler over clones of the given doubles
pub fn reconciler(source: &MockInstanceSource, provider: &MockDnsProvider) -> Reconciler {
    Reconciler::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        test_config(),
    )
    .expect("reconciler construction succeeds")
}
