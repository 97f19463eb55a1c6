//! Contract Test: Invocation Pipeline
//!
//! Constraints verified:
//! - All three trigger shapes reach the reconciler with the right instance id
//! - Non-actionable events are skipped before any collaborator call
//! - Unrecognized payloads are skipped, not raised
//! - Aborts surface in the report with their reason

mod common;

use common::*;
use ec2_ddns_core::{InvocationStatus, RecordSet, SkipReason, handle_event};
use serde_json::json;

fn state_change(instance_id: &str, state: &str) -> serde_json::Value {
    json!({
        "version": "0",
        "detail-type": "EC2 Instance State-change Notification",
        "source": "aws.ec2",
        "region": "us-east-1",
        "resources": [format!("arn:aws:ec2:us-east-1:123456789012:instance/{instance_id}")],
        "detail": { "instance-id": instance_id, "state": state }
    })
}

fn launch_success(instance_id: &str) -> serde_json::Value {
    json!({
        "detail-type": "EC2 Instance Launch Successful",
        "source": "aws.autoscaling",
        "detail": { "EC2InstanceId": instance_id, "AutoScalingGroupName": "web" }
    })
}

fn tag_change(resource_type: &str, arn: &str) -> serde_json::Value {
    json!({
        "detail-type": "Tag Change on Resource",
        "source": "aws.tag",
        "resources": [arn],
        "detail": {
            "changed-tag-keys": ["ip_tracking"],
            "service": "ec2",
            "resource-type": resource_type,
            "tags": { "ip_tracking": "host1" }
        }
    })
}

#[tokio::test]
async fn running_state_change_creates_record() {
    let source = MockInstanceSource::new().with_instance(INSTANCE_ID, tracked(PUBLIC_IP, "host1"));
    let provider = MockDnsProvider::new(ZONE_NAME);
    let reconciler = reconciler(&source, &provider);

    let report = handle_event(&reconciler, &state_change(INSTANCE_ID, "running")).await;

    assert_eq!(report.status, InvocationStatus::Created);
    assert_eq!(report.instance_id.as_ref().map(|id| id.as_str()), Some(INSTANCE_ID));
    assert_eq!(report.record_name.as_deref(), Some("host1.example.com."));
    assert_eq!(report.ip.as_deref(), Some(PUBLIC_IP));
    assert_eq!(provider.upsert_calls(), 1);
}

#[tokio::test]
async fn launch_success_reconciles_instance() {
    let source = MockInstanceSource::new().with_instance(INSTANCE_ID, tracked(PUBLIC_IP, ""));
    let provider = MockDnsProvider::new(ZONE_NAME);
    let reconciler = reconciler(&source, &provider);

    let report = handle_event(&reconciler, &launch_success(INSTANCE_ID)).await;

    assert_eq!(report.status, InvocationStatus::Created);
    assert_eq!(
        report.record_name.as_deref(),
        Some("ec2-instance-i-123.example.com.")
    );
}

#[tokio::test]
async fn tag_change_on_instance_uses_arn_suffix() {
    let source = MockInstanceSource::new().with_instance(INSTANCE_ID, tracked(PUBLIC_IP, "host1"));
    let provider = MockDnsProvider::new(ZONE_NAME)
        .with_record(RecordSet::a("host1.example.com.", PUBLIC_IP));
    let reconciler = reconciler(&source, &provider);

    let arn = format!("arn:aws:ec2:us-east-1:123456789012:instance/{INSTANCE_ID}");
    let report = handle_event(&reconciler, &tag_change("instance", &arn)).await;

    assert_eq!(report.status, InvocationStatus::NoOp);
    assert_eq!(source.describe_calls(), 1);
    assert_eq!(provider.upsert_calls(), 0);
}

#[tokio::test]
async fn non_actionable_events_make_no_collaborator_calls() {
    let source = MockInstanceSource::new().with_instance(INSTANCE_ID, tracked(PUBLIC_IP, "host1"));
    let provider = MockDnsProvider::new(ZONE_NAME);
    let reconciler = reconciler(&source, &provider);

    let cases = [
        (
            state_change(INSTANCE_ID, "stopped"),
            SkipReason::NotRunning {
                state: Some("stopped".to_string()),
            },
        ),
        (
            state_change(INSTANCE_ID, "pending"),
            SkipReason::NotRunning {
                state: Some("pending".to_string()),
            },
        ),
        (
            tag_change("security-group", "arn:aws:ec2:us-east-1:123456789012:security-group/sg-1"),
            SkipReason::NotAnInstance {
                resource_type: Some("security-group".to_string()),
            },
        ),
        (launch_success(""), SkipReason::MissingInstanceId),
        (
            json!({ "detail-type": "EC2 Instance State-change Notification", "detail": { "state": "running" } }),
            SkipReason::MissingInstanceId,
        ),
        (
            json!({ "detail-type": "AWS API Call via CloudTrail", "detail": {} }),
            SkipReason::Unrecognized,
        ),
        (json!({ "hello": "world" }), SkipReason::Unrecognized),
    ];

    for (payload, expected) in cases {
        let report = handle_event(&reconciler, &payload).await;
        assert_eq!(report.status, InvocationStatus::Skipped, "payload {payload}");
        assert_eq!(report.skip, Some(expected));
    }

    assert_eq!(provider.zone_calls(), 0, "Skips must not touch the zone");
    assert_eq!(source.describe_calls(), 0, "Skips must not describe instances");
}

#[tokio::test]
async fn abort_is_reported_not_raised() {
    let source = MockInstanceSource::new();
    let provider = MockDnsProvider::new(ZONE_NAME);
    let reconciler = reconciler(&source, &provider);

    let report = handle_event(&reconciler, &state_change("i-missing", "running")).await;

    assert_eq!(report.status, InvocationStatus::Aborted);
    assert_eq!(report.reason.as_deref(), Some("instance lookup failed"));

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["status"], "aborted");
    assert_eq!(value["abort_kind"], "collaborator_failure");
}

#[test]
fn pipeline_runs_on_a_current_thread_executor() {
    let source = MockInstanceSource::new().with_instance(INSTANCE_ID, tracked(PUBLIC_IP, "host1"));
    let provider = MockDnsProvider::new(ZONE_NAME);
    let reconciler = reconciler(&source, &provider);

    let report = tokio_test::block_on(handle_event(
        &reconciler,
        &state_change(INSTANCE_ID, "running"),
    ));

    assert_eq!(report.status, InvocationStatus::Created);
    tokio_test::assert_ok!(serde_json::to_string(&report));
}
