//! Benchmark results store and persistence
//!
//! Results accumulate across calls on one orchestrator: dataset key -> model
//! ID -> result, with a later result for the same pair replacing the earlier
//! one. Saving writes the whole store in place with no temp file, so a crash
//! mid-write can leave a truncated file behind.

use crate::datasets::RunResult;
use crate::error::ScandevalResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Nested mapping of dataset key -> model ID -> result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultsStore {
    results: BTreeMap<String, BTreeMap<String, RunResult>>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, replacing any earlier result for the same pair
    pub fn record(&mut self, dataset: &str, model_id: &str, result: RunResult) -> Option<RunResult> {
        self.results
            .entry(dataset.to_string())
            .or_default()
            .insert(model_id.to_string(), result)
    }

    pub fn get(&self, dataset: &str, model_id: &str) -> Option<&RunResult> {
        self.results.get(dataset).and_then(|models| models.get(model_id))
    }

    /// All results for one dataset
    pub fn dataset(&self, dataset: &str) -> Option<&BTreeMap<String, RunResult>> {
        self.results.get(dataset)
    }

    pub fn contains(&self, dataset: &str, model_id: &str) -> bool {
        self.get(dataset, model_id).is_some()
    }

    /// Dataset keys that have at least one result
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    /// Number of (dataset, model) cells
    pub fn len(&self) -> usize {
        self.results.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the whole store as JSON, overwriting `path`
    pub async fn save(&self, path: &Path) -> ScandevalResult<()> {
        let content = serde_json::to_string(self)?;
        tokio::fs::write(path, content).await?;

        tracing::info!(
            path = ?path,
            datasets = self.results.len(),
            cells = self.len(),
            "Benchmark results saved"
        );

        Ok(())
    }

    /// Read a store previously written by [`ResultsStore::save`]
    pub async fn load(path: &Path) -> ScandevalResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn result(score: f64) -> RunResult {
        RunResult::new(json!({ "test_f1": score }))
    }

    #[test]
    fn test_record_and_get() {
        let mut store = ResultsStore::new();
        assert!(store.is_empty());

        assert!(store.record("dkhate", "m1", result(0.5)).is_none());
        store.record("dkhate", "m2", result(0.6));
        store.record("dane", "m1", result(0.7));

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("dkhate", "m2"), Some(&result(0.6)));
        assert!(store.contains("dane", "m1"));
        assert!(!store.contains("dane", "m2"));
        assert_eq!(store.dataset("dkhate").unwrap().len(), 2);
        assert_eq!(store.datasets().collect::<Vec<_>>(), vec!["dane", "dkhate"]);
    }

    #[test]
    fn test_record_overwrites_cell() {
        let mut store = ResultsStore::new();
        store.record("dkhate", "m1", result(0.5));
        let previous = store.record("dkhate", "m1", result(0.9));

        assert_eq!(previous, Some(result(0.5)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("dkhate", "m1"), Some(&result(0.9)));
    }

    #[test]
    fn test_serializes_as_nested_object() {
        let mut store = ResultsStore::new();
        store.record("dkhate", "m1", result(0.5));

        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value, json!({ "dkhate": { "m1": { "test_f1": 0.5 } } }));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");

        let mut store = ResultsStore::new();
        store.record("dkhate", "m1", result(0.5));
        store.record("lcc1", "m2", result(0.4));
        store.save(&path).await.unwrap();

        let loaded = ResultsStore::load(&path).await.unwrap();
        assert_eq!(loaded, store);
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, "stale content that is much longer than the new one").unwrap();

        let mut store = ResultsStore::new();
        store.record("dane", "m", result(1.0));
        store.save(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value, json!({ "dane": { "m": { "test_f1": 1.0 } } }));
    }

    #[tokio::test]
    async fn test_save_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("results.json");
        assert!(ResultsStore::new().save(&path).await.is_err());
    }
}
