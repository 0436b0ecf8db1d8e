use serde::{Deserialize, Serialize};

use super::MetricKind;

/// A typed value for exactly one metric kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Steps(u64),
    HeartRate(u32),
    /// Kilocalories.
    ActiveEnergy(f64),
    /// Kilometers.
    WalkingDistance(f64),
    SleepHours(f64),
}

impl MetricValue {
    /// Convert a raw provider reading into the field's type.
    ///
    /// Negative and non-finite readings clamp to zero. Integer fields
    /// truncate toward zero.
    pub fn from_raw(kind: MetricKind, raw: f64) -> Self {
        let v = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        match kind {
            MetricKind::StepCount => MetricValue::Steps(v as u64),
            MetricKind::HeartRate => MetricValue::HeartRate(v as u32),
            MetricKind::ActiveEnergy => MetricValue::ActiveEnergy(v),
            MetricKind::WalkingDistance => MetricValue::WalkingDistance(v),
            MetricKind::SleepDuration => MetricValue::SleepHours(v),
        }
    }

    pub fn zero(kind: MetricKind) -> Self {
        Self::from_raw(kind, 0.0)
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Steps(_) => MetricKind::StepCount,
            MetricValue::HeartRate(_) => MetricKind::HeartRate,
            MetricValue::ActiveEnergy(_) => MetricKind::ActiveEnergy,
            MetricValue::WalkingDistance(_) => MetricKind::WalkingDistance,
            MetricValue::SleepHours(_) => MetricKind::SleepDuration,
        }
    }
}

/// Result of one sub-fetch. Never escalated as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Value { value: MetricValue },
    /// The provider answered but holds no samples for the window.
    NoData,
    Failed { reason: String },
    TimedOut { after_ms: u64 },
}

impl FetchOutcome {
    pub fn value(value: MetricValue) -> Self {
        FetchOutcome::Value { value }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        FetchOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn as_value(&self) -> Option<MetricValue> {
        match self {
            FetchOutcome::Value { value } => Some(*value),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, FetchOutcome::Value { .. })
    }

    /// Short description of why no value was produced.
    pub fn degradation_reason(&self) -> Option<String> {
        match self {
            FetchOutcome::Value { .. } => None,
            FetchOutcome::NoData => Some("no data".to_string()),
            FetchOutcome::Failed { reason } => Some(reason.clone()),
            FetchOutcome::TimedOut { after_ms } => Some(format!("timed out after {after_ms}ms")),
        }
    }
}
