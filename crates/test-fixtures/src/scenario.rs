//! Fixture loader for JSON provider scenarios.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use vitals_core::{MetricKind, MetricSnapshot};

use crate::provider::{FakeProvider, Response};

/// A scripted provider setup plus the snapshot it should produce.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub available: bool,
    pub authorization: bool,
    /// Keyed by metric kind name, e.g. `"step_count"`.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    pub expected: MetricSnapshot,
}

impl Scenario {
    /// Build a provider scripted by this scenario.
    ///
    /// # Panics
    /// Panics on an unknown metric kind name.
    pub fn provider(&self) -> FakeProvider {
        let mut provider = FakeProvider::new().with_authorization(Ok(self.authorization));
        for (name, response) in &self.responses {
            let kind: MetricKind = name
                .parse()
                .unwrap_or_else(|e| panic!("scenario {}: {}", self.name, e));
            provider = provider.with_response(kind, response.clone());
        }
        if !self.available {
            provider = provider.unavailable();
        }
        provider
    }
}

/// Root directory of this crate's fixture files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load `fixtures/scenarios/<name>.json`.
pub fn load_scenario(name: &str) -> Scenario {
    load_fixture(&format!("scenarios/{name}.json"))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// List all JSON files in a fixture subdirectory.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    files.sort();
    files
}
