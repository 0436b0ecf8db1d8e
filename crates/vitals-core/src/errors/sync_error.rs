use crate::models::MetricKind;

use super::ProviderError;

/// Errors surfaced by the aggregator, relay, and authorization gate.
///
/// Only precondition failures end up here. Per-field fetch failures are
/// degraded into the snapshot and never returned.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("unavailable")]
    Unavailable,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0} does not support live updates")]
    NotObservable(MetricKind),

    #[error("{0} is already subscribed")]
    AlreadySubscribed(MetricKind),
}

pub type SyncResult<T> = Result<T, SyncError>;
