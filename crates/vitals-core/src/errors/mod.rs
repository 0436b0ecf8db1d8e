//! Error handling for Vitals.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod provider_error;
pub mod sync_error;

pub use config_error::ConfigError;
pub use provider_error::{ProviderError, ProviderResult};
pub use sync_error::{SyncError, SyncResult};
