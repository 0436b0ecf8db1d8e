//! MetricFetcher: one sub-fetch per call, never escalated as an error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, Instrument};
use vitals_core::constants::SECONDS_PER_HOUR;
use vitals_core::models::QueryShape;
use vitals_core::{fetch_span, Clock, FetchOutcome, HealthProvider, MetricKind, MetricValue, ProviderResult};

/// Reads a single metric kind from the provider and converts the answer
/// into a [`FetchOutcome`].
///
/// Day-scoped kinds read from the start of the current calendar day (per
/// the injected clock) until now. Heart rate reads the newest sample.
pub struct MetricFetcher<P, C> {
    provider: Arc<P>,
    clock: Arc<C>,
    timeout: Option<Duration>,
}

impl<P, C> Clone for MetricFetcher<P, C> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            clock: Arc::clone(&self.clock),
            timeout: self.timeout,
        }
    }
}

impl<P: HealthProvider, C: Clock> MetricFetcher<P, C> {
    /// `timeout: None` waits for the provider indefinitely.
    pub fn new(provider: Arc<P>, clock: Arc<C>, timeout: Option<Duration>) -> Self {
        Self {
            provider,
            clock,
            timeout,
        }
    }

    pub async fn fetch(&self, kind: MetricKind) -> FetchOutcome {
        let read = self.read(kind).instrument(fetch_span!(kind));
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, read).await {
                Ok(outcome) => outcome,
                Err(_) => FetchOutcome::TimedOut {
                    after_ms: limit.as_millis() as u64,
                },
            },
            None => read.await,
        };
        debug!(kind = %kind, outcome = ?outcome, "sub-fetch reported");
        outcome
    }

    async fn read(&self, kind: MetricKind) -> FetchOutcome {
        let now = self.clock.now();
        let start = self.clock.start_of_day(now);

        match kind.query_shape() {
            QueryShape::CumulativeSum => scalar_outcome(
                kind,
                self.provider.query_cumulative_sum(kind, start, now).await,
            ),
            QueryShape::MostRecentSample => {
                scalar_outcome(kind, self.provider.query_most_recent_sample(kind).await)
            }
            QueryShape::CategoryIntervals => {
                match self.provider.query_category_samples(kind, start, now).await {
                    Ok(intervals) if intervals.is_empty() => FetchOutcome::NoData,
                    Ok(intervals) => {
                        let secs: f64 = intervals.iter().map(|i| i.duration_secs()).sum();
                        FetchOutcome::value(MetricValue::from_raw(kind, secs / SECONDS_PER_HOUR))
                    }
                    Err(e) => FetchOutcome::failed(e.to_string()),
                }
            }
        }
    }
}

fn scalar_outcome(kind: MetricKind, result: ProviderResult<Option<f64>>) -> FetchOutcome {
    match result {
        Ok(Some(raw)) => FetchOutcome::value(MetricValue::from_raw(kind, raw)),
        Ok(None) => FetchOutcome::NoData,
        Err(e) => FetchOutcome::failed(e.to_string()),
    }
}
