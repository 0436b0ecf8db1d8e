use crate::models::MetricKind;

/// Errors reported by a health-data provider implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("authorization request failed: {reason}")]
    AuthorizationFailed { reason: String },

    #[error("query for {kind} failed: {reason}")]
    QueryFailed { kind: MetricKind, reason: String },

    #[error("change subscription for {kind} failed: {reason}")]
    SubscriptionFailed { kind: MetricKind, reason: String },
}

pub type ProviderResult<T> = Result<T, ProviderError>;
