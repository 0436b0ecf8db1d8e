//! StateStore: the single mutation point for observable dashboard state.
//!
//! Every write goes through `watch::Sender::send_modify`, so writers are
//! serialized and each receiver only ever sees whole mutations.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use vitals_core::config::FailurePolicy;
use vitals_core::{DashboardState, FetchOutcome, FieldStatus, MetricKind, MetricSnapshot, MetricValue};

use crate::degradation::{DegradationEvent, DegradationTracker, TrackedDegradation};

pub struct StateStore {
    tx: watch::Sender<DashboardState>,
    degradations: Mutex<DegradationTracker>,
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DashboardState::new());
        Self {
            tx,
            degradations: Mutex::new(DegradationTracker::new()),
        }
    }

    /// A receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        self.tx.borrow().snapshot.clone()
    }

    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        self.tracker().events().cloned().collect()
    }

    pub fn set_error(&self, message: Option<String>) {
        self.tx.send_modify(|state| state.error_message = message);
    }

    /// Publish the result of an authorization request.
    pub fn resolve_authorization(&self, granted: bool, error: Option<String>) {
        self.tx.send_modify(|state| {
            state.authorization = state.authorization.resolve(granted);
            if error.is_some() {
                state.error_message = error;
            }
        });
    }

    /// Mark a refresh cycle as started: busy, previous error cleared.
    pub fn begin_cycle(&self) {
        self.tx.send_modify(|state| {
            state.cycles_in_flight += 1;
            state.cycles_started += 1;
            state.error_message = None;
        });
    }

    /// Drop a cycle that will never finalize.
    pub(crate) fn abandon_cycle(&self) {
        self.tx.send_modify(|state| {
            state.cycles_in_flight = state.cycles_in_flight.saturating_sub(1);
        });
    }

    /// Write a finished cycle's outcomes, stamp the snapshot, clear busy.
    pub fn finish_cycle(
        &self,
        outcomes: &[(MetricKind, FetchOutcome)],
        policy: FailurePolicy,
        at: DateTime<Utc>,
    ) {
        self.tx.send_modify(|state| {
            for (kind, outcome) in outcomes {
                match outcome.as_value() {
                    Some(value) => Self::write_fresh(state, value, at),
                    None => {
                        if policy == FailurePolicy::Zero {
                            state.snapshot.apply(MetricValue::zero(*kind));
                        }
                        Self::write_degraded(state, *kind, outcome, at);
                    }
                }
            }
            state.snapshot.touch(at);
            state.cycles_in_flight = state.cycles_in_flight.saturating_sub(1);
        });
        self.track(outcomes, at);
    }

    /// Apply one live-update value: that field plus the timestamp.
    pub fn apply_live(&self, value: MetricValue, at: DateTime<Utc>) {
        self.tx.send_modify(|state| {
            Self::write_fresh(state, value, at);
            state.snapshot.touch(at);
        });
        self.tracker().mark_recovered(value.kind(), at);
    }

    /// A live re-read produced nothing; the snapshot is left as is.
    pub fn record_live_failure(&self, kind: MetricKind, outcome: &FetchOutcome, at: DateTime<Utc>) {
        self.tx
            .send_modify(|state| Self::write_degraded(state, kind, outcome, at));
        self.track(&[(kind, outcome.clone())], at);
    }

    fn write_fresh(state: &mut DashboardState, value: MetricValue, at: DateTime<Utc>) {
        state.snapshot.apply(value);
        state.field_status.insert(value.kind(), FieldStatus::Fresh { at });
    }

    fn write_degraded(
        state: &mut DashboardState,
        kind: MetricKind,
        outcome: &FetchOutcome,
        at: DateTime<Utc>,
    ) {
        let reason = outcome.degradation_reason().unwrap_or_default();
        let since = match state.field_status.get(&kind) {
            Some(FieldStatus::Degraded { since, .. }) => *since,
            _ => at,
        };
        state
            .field_status
            .insert(kind, FieldStatus::Degraded { reason, since });
    }

    fn track(&self, outcomes: &[(MetricKind, FetchOutcome)], at: DateTime<Utc>) {
        let mut tracker = self.tracker();
        for (kind, outcome) in outcomes {
            match outcome.degradation_reason() {
                Some(failure) => {
                    tracker.record(DegradationEvent {
                        kind: *kind,
                        failure,
                        timestamp: at,
                    });
                }
                None => tracker.mark_recovered(*kind, at),
            }
        }
    }

    fn tracker(&self) -> MutexGuard<'_, DegradationTracker> {
        self.degradations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
