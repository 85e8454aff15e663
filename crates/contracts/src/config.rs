//! RunnerConfig - Config Loader output
//!
//! Describes one batch run: target endpoint, admission limit, query source and
//! result persistence. Every field has a default so a run can be driven by CLI
//! flags alone.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Remote search endpoint
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Admission control
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Query store and producer inputs
    #[serde(default)]
    pub queries: QueriesConfig,

    /// Result persistence
    #[serde(default)]
    pub results: ResultsConfig,
}

/// Search endpoint and credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL, e.g. `http://localhost:8094`
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Target index name
    #[serde(default = "default_index")]
    pub index: String,

    /// Per-call timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: default_username(),
            password: default_password(),
            index: default_index(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("index", &self.index)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_username() -> String {
    "username".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_index() -> String {
    "indexname".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Dispatcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum in-flight calls
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Times the whole query list is repeated
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            iterations: default_iterations(),
        }
    }
}

fn default_concurrency() -> usize {
    20
}

fn default_iterations() -> usize {
    1
}

/// Query store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueriesConfig {
    /// Query definition store, generated when missing
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Location samples used to generate the store
    #[serde(default = "default_samples_path")]
    pub samples_path: PathBuf,

    /// Number of queries to generate (multiple of the shape count)
    #[serde(default = "default_query_count")]
    pub count: usize,

    /// Fixed seed for reproducible sample selection
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for QueriesConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            samples_path: default_samples_path(),
            count: default_query_count(),
            seed: None,
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("queries.json")
}

fn default_samples_path() -> PathBuf {
    PathBuf::from("long-lat.json")
}

fn default_query_count() -> usize {
    300
}

/// Result sink type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkType {
    /// JSON results file
    #[default]
    File,
    /// Summary to the log only
    Log,
}

/// Result persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Whether results are persisted at all
    #[serde(default = "default_persist")]
    pub persist: bool,

    #[serde(default)]
    pub sink: SinkType,

    /// Output path for the file sink
    #[serde(default = "default_results_path")]
    pub path: PathBuf,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            persist: default_persist(),
            sink: SinkType::default(),
            path: default_results_path(),
        }
    }
}

fn default_persist() -> bool {
    true
}

fn default_results_path() -> PathBuf {
    PathBuf::from("results.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_flag_defaults() {
        let cfg = RunnerConfig::default();
        assert_eq!(cfg.dispatch.concurrency, 20);
        assert_eq!(cfg.dispatch.iterations, 1);
        assert_eq!(cfg.queries.count, 300);
        assert_eq!(cfg.endpoint.timeout_secs, 30);
        assert!(cfg.results.persist);
        assert_eq!(cfg.results.sink, SinkType::File);
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut endpoint = EndpointConfig::default();
        endpoint.password = "hunter2".into();
        let dbg = format!("{endpoint:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
