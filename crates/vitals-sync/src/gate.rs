//! AuthorizationGate: availability check plus one read-permission request.

use std::sync::Arc;

use tracing::{info, warn, Instrument};
use vitals_core::constants::UNAVAILABLE_MESSAGE;
use vitals_core::{authorization_span, HealthProvider, MetricKind, SyncError, SyncResult};

use crate::store::StateStore;

/// Requests read access to every tracked kind.
///
/// The outcome is published through the [`StateStore`] before the call
/// returns, so observers and the caller agree on the result. Safe to call
/// repeatedly; an existing grant is never revoked by a later call.
pub struct AuthorizationGate<P> {
    provider: Arc<P>,
    store: Arc<StateStore>,
}

impl<P: HealthProvider> AuthorizationGate<P> {
    pub fn new(provider: Arc<P>, store: Arc<StateStore>) -> Self {
        Self { provider, store }
    }

    /// `Ok(true)` when granted, `Ok(false)` when the user declined.
    /// Never contacts the provider when it reports itself unavailable.
    pub async fn request_authorization(&self) -> SyncResult<bool> {
        self.request().instrument(authorization_span!()).await
    }

    async fn request(&self) -> SyncResult<bool> {
        if !self.provider.is_available() {
            warn!("authorization skipped: provider unavailable");
            self.store
                .resolve_authorization(false, Some(UNAVAILABLE_MESSAGE.to_string()));
            return Err(SyncError::Unavailable);
        }

        match self.provider.request_authorization(&MetricKind::ALL).await {
            Ok(granted) => {
                info!(granted, "authorization resolved");
                self.store.resolve_authorization(granted, None);
                Ok(granted)
            }
            Err(e) => {
                warn!(error = %e, "authorization request failed");
                self.store.resolve_authorization(false, Some(e.to_string()));
                Err(e.into())
            }
        }
    }
}
