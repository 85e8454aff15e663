//! QueryStore - the persisted list of query definitions
//!
//! A pretty-printed JSON array. Read once at startup; generated and written
//! when absent.

use std::path::{Path, PathBuf};

use contracts::{ContractError, QueryDefinition};
use tracing::{info, instrument};

use crate::error::Result;
use crate::producer::QueryProducer;
use crate::sample::load_samples;

/// File-backed query definition store
#[derive(Debug, Clone)]
pub struct QueryStore {
    path: PathBuf,
}

impl QueryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all definitions
    pub fn load(&self) -> Result<Vec<QueryDefinition>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.store_error(e))?;
        let defs = serde_json::from_str(&content).map_err(|e| self.store_error(e))?;
        Ok(defs)
    }

    /// Overwrite the store with `defs`
    pub fn save(&self, defs: &[QueryDefinition]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ContractError::from)?;
        }
        let json = serde_json::to_string_pretty(defs).map_err(|e| self.store_error(e))?;
        std::fs::write(&self.path, json).map_err(|e| self.store_error(e))?;
        Ok(())
    }

    /// Load the store, generating it from `samples_path` first if missing
    #[instrument(name = "query_store_load_or_generate", skip(self, producer), fields(path = %self.path.display()))]
    pub fn load_or_generate(
        &self,
        producer: &QueryProducer,
        samples_path: &Path,
        count: usize,
    ) -> Result<Vec<QueryDefinition>> {
        if !self.exists() {
            info!(
                samples = %samples_path.display(),
                count,
                "Query store not found, generating it"
            );
            let samples = load_samples(samples_path)?;
            let defs = producer.produce(&samples, count)?;
            self.save(&defs)?;
            info!(count = defs.len(), "Query store saved");
        }
        self.load()
    }

    fn store_error(&self, e: impl std::fmt::Display) -> ContractError {
        ContractError::query_store(self.path.display().to_string(), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLES: &str = r#"[
        {"bklctrcb": {"geometry": {"coordinates": [10.0, 20.0]}, "relationship": "cousin"}}
    ]"#;

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = QueryStore::new(dir.path().join("nested/queries.json"));
        let defs = vec![QueryDefinition(serde_json::json!({"query": {"match": "x"}}))];

        store.save(&defs).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), defs);
    }

    #[test]
    fn test_load_corrupt_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queries.json");
        std::fs::write(&path, "not json").unwrap();

        let err = QueryStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("queries.json"), "got: {err}");
    }

    #[test]
    fn test_generates_when_missing() {
        let dir = tempdir().unwrap();
        let samples = dir.path().join("long-lat.json");
        std::fs::write(&samples, SAMPLES).unwrap();
        let store = QueryStore::new(dir.path().join("queries.json"));

        let defs = store
            .load_or_generate(&QueryProducer::with_seed(1), &samples, 9)
            .unwrap();
        assert_eq!(defs.len(), 9);
        assert!(store.exists());
    }

    #[test]
    fn test_existing_store_is_not_regenerated() {
        let dir = tempdir().unwrap();
        let store = QueryStore::new(dir.path().join("queries.json"));
        let defs = vec![QueryDefinition(serde_json::json!({"query": {"match": "kept"}}))];
        store.save(&defs).unwrap();

        // Samples path does not exist; must not be touched
        let loaded = store
            .load_or_generate(&QueryProducer::new(), Path::new("/missing.json"), 300)
            .unwrap();
        assert_eq!(loaded, defs);
    }
}
