// # ec2-ddns-core
//
// Core library for keeping a Route 53 style address record in sync with the
// public IP of a tagged compute instance.
//
// ## Architecture Overview
//
// - **Event**: The three trigger shapes, decoded from their envelopes
// - **normalize**: Maps an event to the instance that needs reconciling
// - **naming**: Derives the desired record name from the tracking tag
// - **Reconciler**: Compares desired vs. observed state and writes if needed
// - **InstanceSource** / **DnsProvider**: Collaborator traits implemented by
//   the AWS-backed crates
// - **handle_event**: The per-invocation pipeline
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic is separate from cloud APIs
// 2. **Stateless**: Every invocation starts from scratch; nothing is cached
// 3. **Idempotent**: A record that already matches is never rewritten
// 4. **Explicit outcomes**: Failures are values, not swallowed exceptions
// 5. **Library-First**: All logic is usable without the Lambda binary

pub mod traits;
pub mod event;
pub mod naming;
pub mod reconciler;
pub mod handler;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, InstanceSource, InstanceId, InstanceSnapshot, RecordSet, RecordType};
pub use event::{Event, Normalized, SkipReason, normalize};
pub use reconciler::{AbortKind, AbortReason, Outcome, Reconciler};
pub use handler::{InvocationReport, InvocationStatus, handle_event};
pub use config::DnsManagerConfig;
pub use error::{Error, Result};
