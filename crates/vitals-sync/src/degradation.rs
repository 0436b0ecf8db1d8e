//! Record per-field degradations: kind, failure, timestamp, recovery status.
//!
//! One event per healthy-to-degraded transition; repeat failures of an
//! already degraded kind are not recorded again.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use vitals_core::MetricKind;

/// A sub-fetch that produced no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub kind: MetricKind,
    pub failure: String,
    pub timestamp: DateTime<Utc>,
}

/// Recovery status of a degradation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// The field has not been fetched successfully since.
    Active,
    Recovered,
}

/// A tracked degradation event with recovery status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDegradation {
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// Maximum number of events kept. Oldest recovered events go first.
pub const MAX_TRACKED_EVENTS: usize = 256;

/// Tracks degradation events per metric kind.
#[derive(Debug, Clone)]
pub struct DegradationTracker {
    events: VecDeque<TrackedDegradation>,
    capacity: usize,
}

impl Default for DegradationTracker {
    fn default() -> Self {
        Self::with_capacity(MAX_TRACKED_EVENTS)
    }
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a degradation. Returns false if `event.kind` was already
    /// degraded, in which case nothing is stored.
    pub fn record(&mut self, event: DegradationEvent) -> bool {
        if self.is_degraded(event.kind) {
            tracing::debug!(
                kind = %event.kind,
                failure = %event.failure,
                "metric still degraded"
            );
            return false;
        }
        tracing::warn!(
            kind = %event.kind,
            failure = %event.failure,
            "metric fetch degraded"
        );
        if self.events.len() >= self.capacity {
            self.evict_one();
        }
        self.events.push_back(TrackedDegradation {
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
        true
    }

    /// Mark every active degradation of `kind` as recovered.
    pub fn mark_recovered(&mut self, kind: MetricKind, at: DateTime<Utc>) {
        for tracked in self.events.iter_mut() {
            if tracked.event.kind == kind && tracked.recovery_status == RecoveryStatus::Active {
                tracked.recovery_status = RecoveryStatus::Recovered;
                tracked.recovered_at = Some(at);
            }
        }
    }

    /// Oldest first.
    pub fn events(&self) -> impl Iterator<Item = &TrackedDegradation> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.events
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    pub fn is_degraded(&self, kind: MetricKind) -> bool {
        self.events
            .iter()
            .any(|t| t.event.kind == kind && t.recovery_status == RecoveryStatus::Active)
    }

    /// Count degradations of `kind` that began in the `window` before `now`.
    pub fn count_recent(&self, kind: MetricKind, window: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - window;
        self.events
            .iter()
            .filter(|t| t.event.kind == kind && t.event.timestamp > cutoff)
            .count()
    }

    /// How long `kind` has been continuously degraded, or None if it is not.
    pub fn degraded_duration(&self, kind: MetricKind, now: DateTime<Utc>) -> Option<Duration> {
        self.events
            .iter()
            .find(|t| t.event.kind == kind && t.recovery_status == RecoveryStatus::Active)
            .map(|t| now - t.event.timestamp)
    }

    fn evict_one(&mut self) {
        let oldest_recovered = self
            .events
            .iter()
            .position(|t| t.recovery_status == RecoveryStatus::Recovered);
        match oldest_recovered {
            Some(index) => {
                self.events.remove(index);
            }
            None => {
                self.events.pop_front();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: MetricKind, at: DateTime<Utc>) -> DegradationEvent {
        DegradationEvent {
            kind,
            failure: "no data".to_string(),
            timestamp: at,
        }
    }

    #[test]
    fn recovery_clears_only_matching_kind() {
        let now = Utc::now();
        let mut tracker = DegradationTracker::new();
        tracker.record(event(MetricKind::StepCount, now));
        tracker.record(event(MetricKind::HeartRate, now));

        tracker.mark_recovered(MetricKind::StepCount, now);

        assert!(!tracker.is_degraded(MetricKind::StepCount));
        assert!(tracker.is_degraded(MetricKind::HeartRate));
        assert_eq!(tracker.active_degradations().len(), 1);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn repeat_failures_of_a_degraded_kind_are_not_stored() {
        let now = Utc::now();
        let mut tracker = DegradationTracker::new();

        assert!(tracker.record(event(MetricKind::HeartRate, now)));
        for i in 1..=2000 {
            assert!(!tracker.record(event(MetricKind::HeartRate, now + Duration::seconds(i))));
        }

        assert_eq!(tracker.len(), 1);
        assert_eq!(
            tracker.degraded_duration(MetricKind::HeartRate, now + Duration::minutes(1)),
            Some(Duration::minutes(1))
        );
    }

    #[test]
    fn flapping_kind_stays_within_capacity() {
        let now = Utc::now();
        let mut tracker = DegradationTracker::with_capacity(8);

        for i in 0..100 {
            let at = now + Duration::seconds(i);
            tracker.record(event(MetricKind::StepCount, at));
            tracker.mark_recovered(MetricKind::StepCount, at);
        }
        tracker.record(event(MetricKind::SleepDuration, now));

        assert_eq!(tracker.len(), 8);
        assert!(tracker.is_degraded(MetricKind::SleepDuration));
        let newest_step = tracker
            .events()
            .filter(|t| t.event.kind == MetricKind::StepCount)
            .map(|t| t.event.timestamp)
            .max();
        assert_eq!(newest_step, Some(now + Duration::seconds(99)));
    }

    #[test]
    fn eviction_prefers_recovered_events() {
        let now = Utc::now();
        let mut tracker = DegradationTracker::with_capacity(2);
        tracker.record(event(MetricKind::HeartRate, now));
        tracker.record(event(MetricKind::StepCount, now));
        tracker.mark_recovered(MetricKind::StepCount, now);

        tracker.record(event(MetricKind::SleepDuration, now));

        assert!(tracker.is_degraded(MetricKind::HeartRate));
        assert!(tracker.is_degraded(MetricKind::SleepDuration));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn degraded_duration_and_recent_count() {
        let now = Utc::now();
        let mut tracker = DegradationTracker::new();
        tracker.record(event(MetricKind::SleepDuration, now - Duration::minutes(10)));
        tracker.mark_recovered(MetricKind::SleepDuration, now - Duration::minutes(8));
        tracker.record(event(MetricKind::SleepDuration, now - Duration::minutes(2)));

        assert_eq!(
            tracker.degraded_duration(MetricKind::SleepDuration, now),
            Some(Duration::minutes(2))
        );
        assert_eq!(tracker.degraded_duration(MetricKind::HeartRate, now), None);
        assert_eq!(
            tracker.count_recent(MetricKind::SleepDuration, Duration::minutes(5), now),
            1
        );
    }
}
