//! HealthProvider: the opaque external metrics store.
//!
//! Implementations wrap a platform health store (or a fake in tests). The
//! service never assumes anything about ordering or latency of these calls.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ProviderResult;
use crate::models::MetricKind;

/// A closed category sample, e.g. one stretch of sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SampleInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Length in seconds; inverted intervals count as zero.
    pub fn duration_secs(&self) -> f64 {
        let millis = (self.end - self.start).num_milliseconds().max(0);
        millis as f64 / 1000.0
    }
}

/// One "new samples arrived" signal for a kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub kind: MetricKind,
    pub received_at: DateTime<Utc>,
    /// Set when the provider's observer reported an error instead of a change.
    pub error: Option<String>,
}

impl ChangeNotification {
    pub fn changed(kind: MetricKind, received_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            received_at,
            error: None,
        }
    }

    pub fn errored(kind: MetricKind, received_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            kind,
            received_at,
            error: Some(error.into()),
        }
    }
}

/// Lazy, unbounded, non-restartable sequence of change notifications.
/// Ends when the provider drops its sending half.
pub type ChangeStream = tokio::sync::mpsc::Receiver<ChangeNotification>;

/// Read-only access to an external health-data store.
pub trait HealthProvider: Send + Sync + 'static {
    /// Whether the store exists on this device at all.
    fn is_available(&self) -> bool;

    /// Ask for read access to `kinds`. `Ok(false)` means the user declined.
    fn request_authorization(
        &self,
        kinds: &[MetricKind],
    ) -> impl Future<Output = ProviderResult<bool>> + Send;

    /// Sum of all quantity samples of `kind` in `[start, end]`.
    /// `Ok(None)` when no samples exist in the window.
    fn query_cumulative_sum(
        &self,
        kind: MetricKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = ProviderResult<Option<f64>>> + Send;

    /// Value of the newest sample of `kind`, sorted by end date.
    fn query_most_recent_sample(
        &self,
        kind: MetricKind,
    ) -> impl Future<Output = ProviderResult<Option<f64>>> + Send;

    /// Category samples of `kind` starting in `[start, end]`.
    fn query_category_samples(
        &self,
        kind: MetricKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = ProviderResult<Vec<SampleInterval>>> + Send;

    /// Open a standing change subscription for `kind`.
    fn subscribe_to_changes(&self, kind: MetricKind) -> ProviderResult<ChangeStream>;
}
