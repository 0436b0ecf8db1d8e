//! LiveRelay: standing change subscriptions that re-read a single field.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use vitals_core::config::RelayConfig;
use vitals_core::traits::ChangeStream;
use vitals_core::{live_update_span, Clock, HealthProvider, MetricKind, SyncError, SyncResult};

use crate::fetch::MetricFetcher;
use crate::store::StateStore;

struct Subscription {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Consumes provider change streams for the observed kinds.
///
/// Each notification triggers exactly one re-read of its kind. A value
/// overwrites that field and the timestamp; anything else leaves the
/// snapshot untouched. Must be used inside a Tokio runtime.
pub struct LiveRelay<P, C> {
    provider: Arc<P>,
    clock: Arc<C>,
    fetcher: MetricFetcher<P, C>,
    store: Arc<StateStore>,
    config: RelayConfig,
    subscriptions: DashMap<MetricKind, Subscription>,
}

impl<P: HealthProvider, C: Clock> LiveRelay<P, C> {
    pub fn new(
        provider: Arc<P>,
        clock: Arc<C>,
        fetcher: MetricFetcher<P, C>,
        store: Arc<StateStore>,
        config: RelayConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            fetcher,
            store,
            config,
            subscriptions: DashMap::new(),
        }
    }

    /// Open a change subscription for `kind` and start consuming it.
    ///
    /// A subscription whose stream already ended may be replaced.
    pub fn subscribe(&self, kind: MetricKind) -> SyncResult<()> {
        if !self.config.is_observable(kind) {
            return Err(SyncError::NotObservable(kind));
        }

        let entry = self.subscriptions.entry(kind);
        if let Entry::Occupied(existing) = &entry {
            if !existing.get().handle.is_finished() {
                return Err(SyncError::AlreadySubscribed(kind));
            }
        }

        let stream = self.provider.subscribe_to_changes(kind)?;
        let subscription = self.spawn_consumer(kind, stream);
        match entry {
            Entry::Occupied(mut slot) => {
                slot.insert(subscription);
            }
            Entry::Vacant(slot) => {
                slot.insert(subscription);
            }
        }
        info!(kind = %kind, "live updates subscribed");
        Ok(())
    }

    /// Stop consuming `kind`. Once this returns, no further writes for the
    /// subscription reach the store. Returns false if it was not subscribed.
    pub async fn unsubscribe(&self, kind: MetricKind) -> bool {
        let Some((_, subscription)) = self.subscriptions.remove(&kind) else {
            return false;
        };
        subscription.token.cancel();
        if let Err(e) = subscription.handle.await {
            warn!(kind = %kind, error = %e, "live update task ended abnormally");
        }
        info!(kind = %kind, "live updates unsubscribed");
        true
    }

    /// Stop every subscription, including ones whose stream already ended.
    pub async fn unsubscribe_all(&self) {
        let kinds: Vec<MetricKind> = self.subscriptions.iter().map(|e| *e.key()).collect();
        for kind in kinds {
            self.unsubscribe(kind).await;
        }
    }

    /// True while the consumer for `kind` is running.
    pub fn is_subscribed(&self, kind: MetricKind) -> bool {
        self.subscriptions
            .get(&kind)
            .map(|s| !s.handle.is_finished())
            .unwrap_or(false)
    }

    /// Kinds whose consumer is still running, sorted.
    pub fn subscribed_kinds(&self) -> Vec<MetricKind> {
        let mut kinds: Vec<MetricKind> = self
            .subscriptions
            .iter()
            .filter(|e| !e.value().handle.is_finished())
            .map(|e| *e.key())
            .collect();
        kinds.sort();
        kinds
    }

    fn spawn_consumer(&self, kind: MetricKind, mut stream: ChangeStream) -> Subscription {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let fetcher = self.fetcher.clone();
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);

        let handle = tokio::spawn(async move {
            loop {
                let notification = tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    next = stream.recv() => next,
                };
                let Some(notification) = notification else {
                    debug!(kind = %kind, "change stream closed");
                    break;
                };
                if let Some(error) = &notification.error {
                    warn!(kind = %kind, error = %error, "observer reported an error");
                    continue;
                }

                let outcome = tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    outcome = fetcher.fetch(kind).instrument(live_update_span!(kind)) => outcome,
                };
                let at = clock.now();
                match outcome.as_value() {
                    Some(value) => store.apply_live(value, at),
                    None => store.record_live_failure(kind, &outcome, at),
                }
            }
        });

        Subscription { token, handle }
    }
}

impl<P, C> Drop for LiveRelay<P, C> {
    fn drop(&mut self) {
        for subscription in self.subscriptions.iter() {
            subscription.token.cancel();
        }
    }
}
