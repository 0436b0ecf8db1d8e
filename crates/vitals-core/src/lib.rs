//! # vitals-core
//!
//! Foundation crate for the Vitals metric service.
//! Defines metric kinds, snapshot and state models, the provider and clock
//! traits, errors, config, tracing setup, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;
pub mod tracing_setup;

// Re-export the most commonly used types at the crate root.
pub use config::VitalsConfig;
pub use errors::{ConfigError, ProviderError, ProviderResult, SyncError, SyncResult};
pub use models::{
    AuthorizationState, DashboardState, FetchOutcome, FieldStatus, MetricKind, MetricSnapshot,
    MetricValue,
};
pub use traits::{Clock, HealthProvider, SystemClock};
