//! Desired record name derivation
//!
//! The tracking tag value selects the record name. Cases are checked in a
//! fixed order and the first match wins:
//!
//! 1. empty value → `{default_prefix}-{instance_id}.{zone}`
//! 2. no `.` in the value → `{value}.{zone}`
//! 3. contains `.` but no trailing dot → `{value}.`
//! 4. trailing dot → used as-is
//!
//! Zone membership is checked separately with [`is_in_zone`].

use crate::traits::InstanceId;

/// Key of the tag that marks an instance as tracked (matched case-insensitively)
pub const TRACKING_TAG_KEY: &str = "ip_tracking";

/// Derive the fully-qualified record name for an instance
///
/// `zone_name` is expected in its fully-qualified, trailing-dot form. The tag
/// value is trimmed of surrounding whitespace before any case is checked.
pub fn derive_record_name(
    tag_value: &str,
    instance_id: &InstanceId,
    zone_name: &str,
    default_prefix: &str,
) -> String {
    let value = tag_value.trim();

    if value.is_empty() {
        format!("{default_prefix}-{instance_id}.{zone_name}")
    } else if !value.contains('.') {
        format!("{value}.{zone_name}")
    } else if !value.ends_with('.') {
        format!("{value}.")
    } else {
        value.to_string()
    }
}

/// Whether `record_name` belongs to the zone named `zone_name`
///
/// Plain string suffix comparison on the trailing-dot forms.
pub fn is_in_zone(record_name: &str, zone_name: &str) -> bool {
    record_name.ends_with(zone_name)
}
