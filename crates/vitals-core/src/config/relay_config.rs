use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::MetricKind;

/// Live-update relay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Kinds that accept change subscriptions.
    pub observed_kinds: Vec<MetricKind>,
    /// Subscribe every observed kind once authorization is granted at start.
    pub subscribe_on_start: bool,
}

impl RelayConfig {
    pub fn is_observable(&self, kind: MetricKind) -> bool {
        self.observed_kinds.contains(&kind)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            observed_kinds: defaults::DEFAULT_OBSERVED_KINDS.to_vec(),
            subscribe_on_start: defaults::DEFAULT_SUBSCRIBE_ON_START,
        }
    }
}
