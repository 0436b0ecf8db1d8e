use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MetricKind, MetricValue};

/// Latest merged values for all tracked metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub step_count: u64,
    /// Beats per minute.
    pub heart_rate: u32,
    /// Kilocalories burned since the start of the day.
    pub active_energy: f64,
    /// Kilometers walked or run since the start of the day.
    pub walking_distance: f64,
    pub sleep_hours: f64,
    /// `None` until the first finalize or live update.
    pub last_updated: Option<DateTime<Utc>>,
}

impl MetricSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the one field `value` belongs to. Leaves the timestamp alone.
    pub fn apply(&mut self, value: MetricValue) {
        match value {
            MetricValue::Steps(v) => self.step_count = v,
            MetricValue::HeartRate(v) => self.heart_rate = v,
            MetricValue::ActiveEnergy(v) => self.active_energy = v,
            MetricValue::WalkingDistance(v) => self.walking_distance = v,
            MetricValue::SleepHours(v) => self.sleep_hours = v,
        }
    }

    pub fn get(&self, kind: MetricKind) -> MetricValue {
        match kind {
            MetricKind::StepCount => MetricValue::Steps(self.step_count),
            MetricKind::HeartRate => MetricValue::HeartRate(self.heart_rate),
            MetricKind::ActiveEnergy => MetricValue::ActiveEnergy(self.active_energy),
            MetricKind::WalkingDistance => MetricValue::WalkingDistance(self.walking_distance),
            MetricKind::SleepDuration => MetricValue::SleepHours(self.sleep_hours),
        }
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_updated = Some(at);
    }
}
