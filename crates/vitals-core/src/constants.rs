/// Message published when the provider reports itself unavailable.
pub const UNAVAILABLE_MESSAGE: &str = "Health data is not available on this device.";

/// Seconds in one hour, for sleep interval conversion.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Environment variable read by the tracing subscriber.
pub const LOG_ENV_VAR: &str = "VITALS_LOG";

/// Project-level config file name.
pub const CONFIG_FILENAME: &str = "vitals.toml";
