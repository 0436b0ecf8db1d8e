// Single source of truth for all default values.

use crate::models::MetricKind;

// --- Sync ---
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

// --- Relay ---
pub const DEFAULT_OBSERVED_KINDS: [MetricKind; 2] = [MetricKind::HeartRate, MetricKind::StepCount];
pub const DEFAULT_SUBSCRIBE_ON_START: bool = true;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
