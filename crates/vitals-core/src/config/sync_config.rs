use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// What a field holds after its fetch produced no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep the last successfully fetched value.
    #[default]
    PreservePrevious,
    /// Reset the field to zero.
    Zero,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preserve_previous" => Ok(FailurePolicy::PreservePrevious),
            "zero" => Ok(FailurePolicy::Zero),
            other => Err(format!("unknown failure policy: {other}")),
        }
    }
}

/// Refresh-cycle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for a single sub-fetch. 0 waits forever.
    pub fetch_timeout_ms: u64,
    pub failure_policy: FailurePolicy,
}

impl SyncConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: defaults::DEFAULT_FETCH_TIMEOUT_MS,
            failure_policy: FailurePolicy::default(),
        }
    }
}
