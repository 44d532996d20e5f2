//! Benchmark runner protocol

use crate::config::BenchmarkConfig;
use crate::error::ScandevalResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-call settings handed to every runner invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub num_finetunings: u32,
    pub progress_bar: bool,
    pub batch_size: u32,
    pub evaluate_train: bool,
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from(&BenchmarkConfig::default())
    }
}

impl From<&BenchmarkConfig> for RunConfig {
    fn from(config: &BenchmarkConfig) -> Self {
        Self {
            num_finetunings: config.num_finetunings,
            progress_bar: config.progress_bar,
            batch_size: config.batch_size,
            evaluate_train: config.evaluate_train,
            verbose: config.verbose,
        }
    }
}

/// Result of benchmarking one model on one dataset
///
/// The orchestrator stores it without looking inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResult(serde_json::Value);

impl RunResult {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for RunResult {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Capability to evaluate a model on one dataset
///
/// Implementations return [`crate::ScandevalError::IncompatibleModel`] when
/// the model structurally cannot be evaluated on the dataset; any other error
/// aborts the surrounding batch.
#[async_trait]
pub trait BenchmarkRunner: Send + Sync {
    async fn benchmark(&self, model_id: &str, config: &RunConfig) -> ScandevalResult<RunResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_config_from_benchmark_config() {
        let config = BenchmarkConfig {
            num_finetunings: 3,
            batch_size: 8,
            evaluate_train: true,
            ..Default::default()
        };
        let run_config = RunConfig::from(&config);
        assert_eq!(run_config.num_finetunings, 3);
        assert_eq!(run_config.batch_size, 8);
        assert!(run_config.evaluate_train);
        assert!(run_config.progress_bar);
        assert!(!run_config.verbose);
    }

    #[test]
    fn test_run_result_is_transparent() {
        let result = RunResult::from(json!({"test": {"f1": 0.71}}));
        let serialized = serde_json::to_string(&result).unwrap();
        assert_eq!(serialized, r#"{"test":{"f1":0.71}}"#);
        assert_eq!(result.as_value()["test"]["f1"], json!(0.71));
    }
}
