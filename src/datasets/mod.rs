//! Dataset registry
//!
//! A fixed, ordered list of (key, alias, runner) registrations built once when
//! the orchestrator is constructed. Its order is the order datasets are
//! benchmarked in when no explicit selection is given.

pub mod process;
pub mod runner;
pub mod task;

pub use process::{INCOMPATIBLE_MODEL_EXIT_CODE, ProcessRunner};
pub use runner::{BenchmarkRunner, RunConfig, RunResult};
pub use task::{DatasetParams, TaskKind};

use crate::config::RunnerConfig;
use crate::error::{ScandevalError, ScandevalResult};
use std::collections::HashSet;
use std::sync::Arc;

/// One dataset the orchestrator can benchmark on
#[derive(Clone)]
pub struct Registration {
    pub key: String,
    pub alias: String,
    pub runner: Arc<dyn BenchmarkRunner>,
}

impl Registration {
    pub fn new(
        key: impl Into<String>,
        alias: impl Into<String>,
        runner: Arc<dyn BenchmarkRunner>,
    ) -> Self {
        Self {
            key: key.into(),
            alias: alias.into(),
            runner,
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("alias", &self.alias)
            .finish_non_exhaustive()
    }
}

/// Ordered, immutable set of registrations with unique keys
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    registrations: Vec<Registration>,
}

impl DatasetRegistry {
    /// Create a registry, rejecting duplicate keys
    pub fn new(registrations: Vec<Registration>) -> ScandevalResult<Self> {
        let mut seen = HashSet::new();
        for registration in &registrations {
            if !seen.insert(registration.key.as_str()) {
                return Err(ScandevalError::Config(format!(
                    "Duplicate dataset key: {}",
                    registration.key
                )));
            }
        }
        Ok(Self { registrations })
    }

    /// The standard Danish battery, each dataset run through the fine-tuning command
    pub fn standard(runner_config: &RunnerConfig) -> Self {
        let registrations = DatasetParams::standard()
            .into_iter()
            .map(|params| {
                let key = params.key.clone();
                let alias = params.alias.clone();
                let runner: Arc<dyn BenchmarkRunner> =
                    Arc::new(ProcessRunner::new(params, runner_config.clone()));
                Registration::new(key, alias, runner)
            })
            .collect();

        // Keys of the standard battery are unique
        Self { registrations }
    }

    /// Registrations whose key is in `keys`, in registry order
    ///
    /// Unknown keys are ignored.
    pub fn select(&self, keys: &[String]) -> Vec<&Registration> {
        self.registrations
            .iter()
            .filter(|r| keys.iter().any(|k| k == &r.key))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Registration> {
        self.registrations.iter().find(|r| r.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(|r| r.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
