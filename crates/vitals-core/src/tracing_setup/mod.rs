//! Tracing initialization and span definitions.

pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Initialize the Vitals tracing/logging system.
///
/// Reads the `VITALS_LOG` environment variable for per-module log levels.
/// Format: `VITALS_LOG=vitals_sync=debug,vitals_core=warn`
///
/// Falls back to `info` for the Vitals crates if `VITALS_LOG` is not set or is invalid.
///
/// Calling it more than once is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| default_filter("info"));
    init_with(filter, false);
}

/// Initialize tracing from an [`ObservabilityConfig`].
/// `VITALS_LOG` still wins over `log_level` when set.
pub fn init_tracing_from_config(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| default_filter(&config.log_level));
    init_with(filter, config.json_logs);
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("vitals_core={level},vitals_sync={level}"))
}

fn init_with(filter: EnvFilter, json: bool) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        if json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
    });
}
