//! Top-level Vitals configuration with layered resolution.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{defaults, ObservabilityConfig, RelayConfig, SyncConfig};
use crate::constants::CONFIG_FILENAME;
use crate::errors::ConfigError;
use crate::models::MetricKind;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`VITALS_*`)
/// 2. Project config (`vitals.toml` in the given root)
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VitalsConfig {
    pub sync: SyncConfig,
    pub relay: RelayConfig,
    pub observability: ObservabilityConfig,
}

impl VitalsConfig {
    /// Load configuration from `root/vitals.toml` (if present) and the
    /// environment, then validate.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILENAME);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse a single TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &VitalsConfig) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for kind in &config.relay.observed_kinds {
            if !seen.insert(*kind) {
                return Err(ConfigError::ValidationFailed {
                    field: "relay.observed_kinds".to_string(),
                    message: format!("{kind} listed more than once"),
                });
            }
        }
        let level = config.observability.log_level.as_str();
        if !defaults::LOG_LEVELS.contains(&level) {
            return Err(ConfigError::InvalidValue {
                field: "observability.log_level".to_string(),
                message: format!("expected one of {:?}, got {level:?}", defaults::LOG_LEVELS),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Values that fail to parse are ignored.
    fn apply_env_overrides(config: &mut VitalsConfig) {
        if let Ok(val) = std::env::var("VITALS_SYNC_FETCH_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.sync.fetch_timeout_ms = v;
            }
        }
        if let Ok(val) = std::env::var("VITALS_SYNC_FAILURE_POLICY") {
            if let Ok(v) = val.parse() {
                config.sync.failure_policy = v;
            }
        }
        if let Ok(val) = std::env::var("VITALS_RELAY_OBSERVED_KINDS") {
            let kinds: Result<Vec<MetricKind>, _> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect();
            if let Ok(kinds) = kinds {
                config.relay.observed_kinds = kinds;
            }
        }
        if let Ok(val) = std::env::var("VITALS_LOG_LEVEL") {
            let level = val.trim().to_lowercase();
            if defaults::LOG_LEVELS.contains(&level.as_str()) {
                config.observability.log_level = level;
            }
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
