//! Configuration types for the EC2 DNS reconciler
//!
//! Configuration is read from environment-style key/value pairs exactly once
//! at process start and then handed to the [`Reconciler`](crate::Reconciler)
//! by value. Nothing inside the reconciliation path reads the environment.
//!
//! ## Recognized keys
//!
//! - `HOSTED_ZONE_ID` (required): identifier of the managed hosted zone
//! - `DEFAULT_DNS_PREFIX` (optional, default `ec2-instance`): prefix used when
//!   the tracking tag carries no explicit name
//! - `DDNS_MODE` (optional): `dry-run` performs all reads but skips writes
//! - `LOG_LEVEL` (optional, default `info`)

use serde::{Deserialize, Serialize};

/// Environment key holding the hosted zone identifier
pub const HOSTED_ZONE_ID_KEY: &str = "HOSTED_ZONE_ID";

/// Environment key holding the default record prefix
pub const DEFAULT_DNS_PREFIX_KEY: &str = "DEFAULT_DNS_PREFIX";

/// Environment key selecting live or dry-run mode
pub const MODE_KEY: &str = "DDNS_MODE";

/// Environment key holding the log level
pub const LOG_LEVEL_KEY: &str = "LOG_LEVEL";

/// Main reconciler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsManagerConfig {
    /// Identifier of the managed hosted zone (e.g. "Z0123456789ABC")
    pub hosted_zone_id: String,

    /// Prefix for records whose tracking tag value is empty
    #[serde(default = "default_dns_prefix")]
    pub default_dns_prefix: String,

    /// Perform reads but skip record writes
    #[serde(default)]
    pub dry_run: bool,

    /// Log level for the hosting binary
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl DnsManagerConfig {
    /// Create a configuration for the given zone with defaults for everything else
    pub fn new(hosted_zone_id: impl Into<String>) -> Self {
        Self {
            hosted_zone_id: hosted_zone_id.into(),
            default_dns_prefix: default_dns_prefix(),
            dry_run: false,
            log_level: default_log_level(),
        }
    }

    /// Set the default record prefix
    pub fn with_default_dns_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_dns_prefix = prefix.into();
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build a configuration from a key lookup function
    ///
    /// The lookup returns `None` for unset keys. Empty values for optional
    /// keys fall back to their defaults. The result is validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let hosted_zone_id = non_empty(HOSTED_ZONE_ID_KEY).ok_or_else(|| {
            crate::Error::config(format!(
                "{HOSTED_ZONE_ID_KEY} is required. Set it to the id of the managed hosted zone"
            ))
        })?;

        let config = Self {
            hosted_zone_id,
            default_dns_prefix: non_empty(DEFAULT_DNS_PREFIX_KEY)
                .unwrap_or_else(default_dns_prefix),
            dry_run: non_empty(MODE_KEY)
                .is_some_and(|mode| mode.eq_ignore_ascii_case("dry-run")),
            log_level: non_empty(LOG_LEVEL_KEY)
                .map(|level| level.to_lowercase())
                .unwrap_or_else(default_log_level),
        };

        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from the process environment
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.hosted_zone_id.trim().is_empty() {
            return Err(crate::Error::config(format!(
                "{HOSTED_ZONE_ID_KEY} cannot be empty"
            )));
        }

        validate_label(&self.default_dns_prefix).map_err(|reason| {
            crate::Error::config(format!(
                "{DEFAULT_DNS_PREFIX_KEY} '{}' is not a valid DNS label: {reason}",
                self.default_dns_prefix
            ))
        })?;

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(crate::Error::config(format!(
                "{LOG_LEVEL_KEY} '{other}' is not valid. Valid levels: trace, debug, info, warn, error"
            ))),
        }
    }
}

/// Check a single DNS label (RFC 1035 letters, digits and hyphens)
fn validate_label(label: &str) -> Result<(), &'static str> {
    if label.is_empty() {
        return Err("label is empty");
    }
    if label.len() > 63 {
        return Err("label is longer than 63 characters");
    }
    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("only letters, digits and hyphens are allowed");
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err("label cannot start or end with a hyphen");
    }
    Ok(())
}

fn default_dns_prefix() -> String {
    "ec2-instance".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
