//! # vitals-sync
//!
//! Keeps a [`DashboardState`](vitals_core::DashboardState) in step with a
//! [`HealthProvider`](vitals_core::HealthProvider):
//!
//! - [`Aggregator`] fans out one read per metric kind and finalizes the
//!   snapshot once all of them reported.
//! - [`LiveRelay`] turns provider change streams into single-field re-reads.
//! - [`AuthorizationGate`] checks availability and asks for read access.
//! - [`VitalsService`] wires the three together around one [`StateStore`].

pub mod aggregator;
pub mod degradation;
pub mod fetch;
pub mod gate;
pub mod relay;
pub mod service;
pub mod store;

pub use aggregator::{Aggregator, CycleReport};
pub use degradation::{DegradationEvent, DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use fetch::MetricFetcher;
pub use gate::AuthorizationGate;
pub use relay::LiveRelay;
pub use service::{StartReport, VitalsService};
pub use store::StateStore;
