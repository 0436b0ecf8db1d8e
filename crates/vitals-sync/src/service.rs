//! VitalsService: one explicitly constructed owner of the provider handle
//! and the observable state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};
use vitals_core::{
    Clock, DashboardState, HealthProvider, MetricKind, MetricSnapshot, SyncResult, SystemClock,
    VitalsConfig,
};

use crate::aggregator::{Aggregator, CycleReport};
use crate::degradation::TrackedDegradation;
use crate::fetch::MetricFetcher;
use crate::gate::AuthorizationGate;
use crate::relay::LiveRelay;
use crate::store::StateStore;

/// What [`VitalsService::start`] did.
#[derive(Debug, Clone, Serialize)]
pub struct StartReport {
    pub granted: bool,
    pub subscribed: Vec<MetricKind>,
    pub refresh: Option<CycleReport>,
}

pub struct VitalsService<P, C = SystemClock> {
    config: VitalsConfig,
    store: Arc<StateStore>,
    gate: AuthorizationGate<P>,
    aggregator: Aggregator<P, C>,
    relay: LiveRelay<P, C>,
}

impl<P: HealthProvider> VitalsService<P, SystemClock> {
    pub fn with_system_clock(provider: Arc<P>, config: VitalsConfig) -> Self {
        Self::new(provider, Arc::new(SystemClock), config)
    }
}

impl<P: HealthProvider, C: Clock> VitalsService<P, C> {
    pub fn new(provider: Arc<P>, clock: Arc<C>, config: VitalsConfig) -> Self {
        let store = Arc::new(StateStore::new());
        let fetcher = MetricFetcher::new(
            Arc::clone(&provider),
            Arc::clone(&clock),
            config.sync.fetch_timeout(),
        );
        let gate = AuthorizationGate::new(Arc::clone(&provider), Arc::clone(&store));
        let aggregator = Aggregator::new(
            Arc::clone(&provider),
            Arc::clone(&clock),
            fetcher.clone(),
            Arc::clone(&store),
            config.sync.failure_policy,
        );
        let relay = LiveRelay::new(
            provider,
            clock,
            fetcher,
            Arc::clone(&store),
            config.relay.clone(),
        );

        Self {
            config,
            store,
            gate,
            aggregator,
            relay,
        }
    }

    /// Authorize, then (if granted) subscribe the observed kinds and run the
    /// first refresh.
    pub async fn start(&self) -> SyncResult<StartReport> {
        let granted = self.gate.request_authorization().await?;
        if !granted {
            info!("authorization declined; live updates and refresh not started");
            return Ok(StartReport {
                granted,
                subscribed: Vec::new(),
                refresh: None,
            });
        }

        let mut subscribed = Vec::new();
        if self.config.relay.subscribe_on_start {
            for kind in &self.config.relay.observed_kinds {
                match self.relay.subscribe(*kind) {
                    Ok(()) => subscribed.push(*kind),
                    Err(e) => warn!(kind = %kind, error = %e, "live updates not started"),
                }
            }
        }

        let refresh = self.aggregator.refresh().await?;
        Ok(StartReport {
            granted,
            subscribed,
            refresh: Some(refresh),
        })
    }

    pub async fn request_authorization(&self) -> SyncResult<bool> {
        self.gate.request_authorization().await
    }

    pub async fn refresh(&self) -> SyncResult<CycleReport> {
        self.aggregator.refresh().await
    }

    pub fn subscribe(&self, kind: MetricKind) -> SyncResult<()> {
        self.relay.subscribe(kind)
    }

    pub async fn unsubscribe(&self, kind: MetricKind) -> bool {
        self.relay.unsubscribe(kind).await
    }

    pub fn is_subscribed(&self, kind: MetricKind) -> bool {
        self.relay.is_subscribed(kind)
    }

    pub fn subscribed_kinds(&self) -> Vec<MetricKind> {
        self.relay.subscribed_kinds()
    }

    /// Stop every live subscription.
    pub async fn shutdown(&self) {
        self.relay.unsubscribe_all().await;
    }

    /// Observe every published state.
    pub fn state(&self) -> watch::Receiver<DashboardState> {
        self.store.subscribe()
    }

    pub fn current(&self) -> DashboardState {
        self.store.current()
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        self.store.snapshot()
    }

    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        self.store.degradations()
    }

    pub fn config(&self) -> &VitalsConfig {
        &self.config
    }
}
