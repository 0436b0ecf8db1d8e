//! Configuration system for Vitals.
//! TOML-based, 3-layer resolution: env > project file > defaults.

pub mod defaults;
pub mod observability_config;
pub mod relay_config;
pub mod sync_config;
pub mod vitals_config;

pub use observability_config::ObservabilityConfig;
pub use relay_config::RelayConfig;
pub use sync_config::{FailurePolicy, SyncConfig};
pub use vitals_config::VitalsConfig;
