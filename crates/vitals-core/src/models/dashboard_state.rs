use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthorizationState, MetricKind, MetricSnapshot};

/// Per-field freshness marker.
///
/// Separates "the provider reported zero" from "the last fetch produced
/// nothing", which the snapshot values alone cannot express.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldStatus {
    #[default]
    NeverFetched,
    Fresh { at: DateTime<Utc> },
    Degraded { reason: String, since: DateTime<Utc> },
}

impl FieldStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, FieldStatus::Degraded { .. })
    }
}

/// Everything the presentation layer observes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub snapshot: MetricSnapshot,
    /// Refresh cycles started but not yet finalized.
    pub cycles_in_flight: usize,
    /// Refresh cycles started since construction.
    pub cycles_started: u64,
    pub error_message: Option<String>,
    pub authorization: AuthorizationState,
    pub field_status: BTreeMap<MetricKind, FieldStatus>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            field_status: MetricKind::ALL
                .into_iter()
                .map(|k| (k, FieldStatus::NeverFetched))
                .collect(),
            ..Default::default()
        }
    }

    /// The busy flag.
    pub fn is_loading(&self) -> bool {
        self.cycles_in_flight > 0
    }

    pub fn status_of(&self, kind: MetricKind) -> &FieldStatus {
        static NEVER: FieldStatus = FieldStatus::NeverFetched;
        self.field_status.get(&kind).unwrap_or(&NEVER)
    }
}
