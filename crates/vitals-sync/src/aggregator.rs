//! Aggregator: fan out one sub-fetch per metric kind, fan in once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};
use vitals_core::config::FailurePolicy;
use vitals_core::constants::UNAVAILABLE_MESSAGE;
use vitals_core::{
    refresh_span, Clock, FetchOutcome, HealthProvider, MetricKind, SyncError, SyncResult,
};

use crate::fetch::MetricFetcher;
use crate::store::StateStore;

/// What one refresh cycle observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<(MetricKind, FetchOutcome)>,
}

impl CycleReport {
    pub fn outcome(&self, kind: MetricKind) -> Option<&FetchOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }

    pub fn degraded_kinds(&self) -> Vec<MetricKind> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_value())
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_value())
    }
}

/// Runs refresh cycles against the provider and finalizes them into the
/// shared [`StateStore`].
///
/// Cycles may overlap; whichever finalizes last owns the timestamp.
pub struct Aggregator<P, C> {
    provider: Arc<P>,
    clock: Arc<C>,
    fetcher: MetricFetcher<P, C>,
    store: Arc<StateStore>,
    policy: FailurePolicy,
    last_cycle_id: AtomicU64,
}

impl<P: HealthProvider, C: Clock> Aggregator<P, C> {
    pub fn new(
        provider: Arc<P>,
        clock: Arc<C>,
        fetcher: MetricFetcher<P, C>,
        store: Arc<StateStore>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            provider,
            clock,
            fetcher,
            store,
            policy,
            last_cycle_id: AtomicU64::new(0),
        }
    }

    /// Run one refresh cycle.
    ///
    /// Fails only when the provider is unavailable, in which case no
    /// sub-fetch is issued and the busy flag is never raised.
    pub async fn refresh(&self) -> SyncResult<CycleReport> {
        if !self.provider.is_available() {
            warn!("refresh skipped: provider unavailable");
            self.store.set_error(Some(UNAVAILABLE_MESSAGE.to_string()));
            return Err(SyncError::Unavailable);
        }

        let cycle_id = self.last_cycle_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.run_cycle(cycle_id)
            .instrument(refresh_span!(cycle_id))
            .await
    }

    async fn run_cycle(&self, cycle_id: u64) -> SyncResult<CycleReport> {
        let started_at = self.clock.now();
        self.store.begin_cycle();
        let guard = CycleGuard::new(&self.store);
        info!(cycle_id, "refresh cycle started");

        let (steps, heart_rate, energy, distance, sleep) = tokio::join!(
            self.fetcher.fetch(MetricKind::StepCount),
            self.fetcher.fetch(MetricKind::HeartRate),
            self.fetcher.fetch(MetricKind::ActiveEnergy),
            self.fetcher.fetch(MetricKind::WalkingDistance),
            self.fetcher.fetch(MetricKind::SleepDuration),
        );
        let outcomes = vec![
            (MetricKind::StepCount, steps),
            (MetricKind::HeartRate, heart_rate),
            (MetricKind::ActiveEnergy, energy),
            (MetricKind::WalkingDistance, distance),
            (MetricKind::SleepDuration, sleep),
        ];

        let finished_at = self.clock.now();
        self.store.finish_cycle(&outcomes, self.policy, finished_at);
        guard.disarm();

        let report = CycleReport {
            cycle_id,
            started_at,
            finished_at,
            outcomes,
        };
        info!(
            cycle_id,
            degraded = report.degraded_kinds().len(),
            "refresh cycle finalized"
        );
        Ok(report)
    }
}

/// Releases the busy flag if a cycle future is dropped before finalizing.
struct CycleGuard<'a> {
    store: &'a StateStore,
    armed: bool,
}

impl<'a> CycleGuard<'a> {
    fn new(store: &'a StateStore) -> Self {
        Self { store, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("refresh cycle dropped before finalize");
            self.store.abandon_cycle();
        }
    }
}
