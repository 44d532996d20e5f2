//! Configuration structures and loading logic

use crate::selection::FilterSelection;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Batch sizes the fine-tuning command accepts
pub const ALLOWED_BATCH_SIZES: [u32; 6] = [1, 2, 4, 8, 16, 32];

/// Main benchmark configuration
///
/// Every run-level field is a default that a single call may override via
/// [`RunOverrides`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Number of times each model is fine-tuned per dataset
    pub num_finetunings: u32,
    pub progress_bar: bool,
    /// Write the results store to `results_path` after each run
    pub save_results: bool,
    pub language: FilterSelection,
    pub task: FilterSelection,
    pub batch_size: u32,
    /// Also evaluate on the training split
    pub evaluate_train: bool,
    pub verbose: bool,
    pub results_path: PathBuf,
    pub catalog: CatalogConfig,
    pub runner: RunnerConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            num_finetunings: default_num_finetunings(),
            progress_bar: true,
            save_results: false,
            language: default_languages(),
            task: FilterSelection::All,
            batch_size: default_batch_size(),
            evaluate_train: false,
            verbose: false,
            results_path: default_results_path(),
            catalog: CatalogConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(n) = std::env::var("SCANDEVAL_NUM_FINETUNINGS") {
            config.num_finetunings = n
                .parse()
                .context("Invalid SCANDEVAL_NUM_FINETUNINGS value")?;
        }
        if let Ok(batch_size) = std::env::var("SCANDEVAL_BATCH_SIZE") {
            config.batch_size = batch_size
                .parse()
                .context("Invalid SCANDEVAL_BATCH_SIZE value")?;
        }
        if let Ok(path) = std::env::var("SCANDEVAL_RESULTS_PATH") {
            config.results_path = PathBuf::from(path);
        }
        if let Ok(binary) = std::env::var("SCANDEVAL_RUNNER_BINARY") {
            config.runner.binary = binary;
        }
        if let Ok(endpoint) = std::env::var("SCANDEVAL_CATALOG_ENDPOINT") {
            config.catalog.endpoint = endpoint;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_batch_size(self.batch_size)?;

        if self.num_finetunings == 0 {
            anyhow::bail!("num_finetunings must be at least 1");
        }
        if self.runner.binary.trim().is_empty() {
            anyhow::bail!("runner.binary cannot be empty");
        }
        if self.catalog.endpoint.trim().is_empty() {
            anyhow::bail!("catalog.endpoint cannot be empty");
        }
        if self.catalog.limit == Some(0) {
            anyhow::bail!("catalog.limit must be positive when set");
        }
        if self.catalog.timeout_secs == 0 {
            anyhow::bail!("catalog.timeout_secs must be at least 1");
        }
        if self.runner.timeout_secs == Some(0) {
            anyhow::bail!("runner.timeout_secs must be positive when set");
        }

        Ok(())
    }

    /// Merge per-call overrides over these defaults
    pub fn with_overrides(&self, overrides: &RunOverrides) -> Self {
        let mut config = self.clone();
        if let Some(n) = overrides.num_finetunings {
            config.num_finetunings = n;
        }
        if let Some(progress_bar) = overrides.progress_bar {
            config.progress_bar = progress_bar;
        }
        if let Some(save_results) = overrides.save_results {
            config.save_results = save_results;
        }
        if let Some(language) = &overrides.language {
            config.language = language.clone();
        }
        if let Some(task) = &overrides.task {
            config.task = task.clone();
        }
        if let Some(batch_size) = overrides.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(evaluate_train) = overrides.evaluate_train {
            config.evaluate_train = evaluate_train;
        }
        if let Some(verbose) = overrides.verbose {
            config.verbose = verbose;
        }
        config
    }
}

/// Per-call overrides; `None` keeps the configured default
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub num_finetunings: Option<u32>,
    pub progress_bar: Option<bool>,
    pub save_results: Option<bool>,
    pub language: Option<FilterSelection>,
    pub task: Option<FilterSelection>,
    pub batch_size: Option<u32>,
    pub evaluate_train: Option<bool>,
    pub verbose: Option<bool>,
}

/// Model catalog (HuggingFace Hub listing) settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the model hub
    pub endpoint: String,
    /// Maximum number of models returned per query; hub default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_catalog_endpoint(),
            limit: None,
            timeout_secs: default_catalog_timeout(),
        }
    }
}

/// Fine-tuning command settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Command that fine-tunes and evaluates one model on one dataset
    pub binary: String,
    /// Arguments placed before the generated ones
    pub args: Vec<String>,
    /// Where downloaded models are stored
    pub cache_dir: PathBuf,
    /// Abort a single fine-tuning run after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            binary: default_runner_binary(),
            args: Vec::new(),
            cache_dir: default_cache_dir(),
            timeout_secs: None,
        }
    }
}

fn validate_batch_size(batch_size: u32) -> Result<()> {
    if !ALLOWED_BATCH_SIZES.contains(&batch_size) {
        anyhow::bail!(
            "batch_size must be one of {:?} (got {})",
            ALLOWED_BATCH_SIZES,
            batch_size
        );
    }
    Ok(())
}

// Default functions
fn default_num_finetunings() -> u32 {
    10
}
fn default_languages() -> FilterSelection {
    FilterSelection::from(vec!["da", "sv", "no", "nb", "nn", "is", "fo"])
}
fn default_batch_size() -> u32 {
    32
}
fn default_results_path() -> PathBuf {
    PathBuf::from("scandeval_benchmark_results.json")
}
fn default_catalog_endpoint() -> String {
    "https://huggingface.co".to_string()
}
fn default_catalog_timeout() -> u64 {
    30
}
fn default_runner_binary() -> String {
    "scandeval-finetune".to_string()
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from(".benchmark_models")
}
