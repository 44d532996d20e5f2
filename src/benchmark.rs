//! Benchmark orchestrator
//!
//! Resolves a (possibly partial) selection of models and datasets into a run
//! list, benchmarks every (dataset, model) pair one after the other and
//! accumulates the results across calls.

use crate::catalog::{CatalogCache, CatalogKey, CatalogSource, HubCatalogSource};
use crate::config::{BenchmarkConfig, RunOverrides};
use crate::datasets::{DatasetRegistry, Registration, RunConfig};
use crate::error::{ScandevalError, ScandevalResult};
use crate::results::ResultsStore;
use crate::selection::{Filter, FilterSelection, Selection};
use std::collections::HashSet;
use std::sync::Arc;

/// What a single call should benchmark
///
/// Unset models are discovered through the model catalog; unset datasets
/// mean every registered dataset.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRequest {
    pub models: Option<Selection>,
    pub datasets: Option<Selection>,
    pub overrides: RunOverrides,
}

impl BenchmarkRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Benchmark exactly these model IDs
    pub fn models(mut self, models: impl Into<Selection>) -> Self {
        self.models = Some(models.into());
        self
    }

    pub fn model(self, model_id: &str) -> Self {
        self.models(model_id)
    }

    /// Benchmark only on these dataset keys
    pub fn datasets(mut self, datasets: impl Into<Selection>) -> Self {
        self.datasets = Some(datasets.into());
        self
    }

    pub fn dataset(self, dataset: &str) -> Self {
        self.datasets(dataset)
    }

    pub fn num_finetunings(mut self, n: u32) -> Self {
        self.overrides.num_finetunings = Some(n);
        self
    }

    pub fn progress_bar(mut self, progress_bar: bool) -> Self {
        self.overrides.progress_bar = Some(progress_bar);
        self
    }

    pub fn save_results(mut self, save_results: bool) -> Self {
        self.overrides.save_results = Some(save_results);
        self
    }

    pub fn language(mut self, language: impl Into<FilterSelection>) -> Self {
        self.overrides.language = Some(language.into());
        self
    }

    pub fn task(mut self, task: impl Into<FilterSelection>) -> Self {
        self.overrides.task = Some(task.into());
        self
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.overrides.batch_size = Some(batch_size);
        self
    }

    pub fn evaluate_train(mut self, evaluate_train: bool) -> Self {
        self.overrides.evaluate_train = Some(evaluate_train);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.overrides.verbose = Some(verbose);
        self
    }
}

/// Benchmarks language models on the registered datasets
///
/// The model catalog and the results store live as long as the instance, so
/// repeated calls reuse the catalog and add to the same results.
pub struct Benchmark {
    config: BenchmarkConfig,
    registry: DatasetRegistry,
    catalog: CatalogCache,
    results: ResultsStore,
}

impl Benchmark {
    /// Create an orchestrator over the standard datasets and the HuggingFace Hub
    pub fn new(config: BenchmarkConfig) -> ScandevalResult<Self> {
        validate(&config)?;
        let registry = DatasetRegistry::standard(&config.runner);
        let source = Arc::new(HubCatalogSource::new(config.catalog.clone())?);
        Ok(Self::with_parts(config, registry, source))
    }

    /// Create an orchestrator with a custom registry and catalog source
    pub fn with_parts(
        config: BenchmarkConfig,
        registry: DatasetRegistry,
        source: Arc<dyn CatalogSource>,
    ) -> Self {
        Self {
            config,
            registry,
            catalog: CatalogCache::new(source),
            results: ResultsStore::new(),
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Everything benchmarked so far on this instance
    pub fn results(&self) -> &ResultsStore {
        &self.results
    }

    /// Benchmark the requested models on the requested datasets
    ///
    /// Returns the full results store, not just this call's additions. A
    /// failure other than an incompatible model aborts the call; results
    /// recorded before the failure are kept.
    pub async fn run(&mut self, request: BenchmarkRequest) -> ScandevalResult<&ResultsStore> {
        let config = self.config.with_overrides(&request.overrides);
        validate(&config)?;

        let model_ids = self
            .resolve_models(request.models.as_ref(), &config.language, &config.task)
            .await?;
        let datasets = self.resolve_datasets(request.datasets.as_ref());

        tracing::debug!(
            models = model_ids.len(),
            datasets = datasets.len(),
            "Resolved benchmark selection"
        );

        let run_config = RunConfig::from(&config);
        let outcome = self.run_pairs(&datasets, &model_ids, &run_config).await;
        crate::metrics::update_results_count(self.results.len());
        outcome?;

        if config.save_results {
            self.results.save(&config.results_path).await?;
        }

        Ok(&self.results)
    }

    /// Registrations to run, in registry order
    fn resolve_datasets(&self, datasets: Option<&Selection>) -> Vec<Registration> {
        match datasets {
            None => self.registry.iter().cloned().collect(),
            Some(selection) => {
                for key in selection.as_slice() {
                    if !self.registry.contains(key) {
                        tracing::debug!(dataset = %key, "Ignoring unknown dataset");
                    }
                }
                self.registry
                    .select(selection.as_slice())
                    .into_iter()
                    .cloned()
                    .collect()
            }
        }
    }

    /// Explicit model IDs as given, otherwise candidates from the catalog
    async fn resolve_models(
        &mut self,
        models: Option<&Selection>,
        language: &FilterSelection,
        task: &FilterSelection,
    ) -> ScandevalResult<Vec<String>> {
        if let Some(models) = models {
            return Ok(models.as_slice().to_vec());
        }

        let languages = language.normalize();
        let tasks = task.normalize();

        if !self.catalog.is_populated() {
            self.catalog.rebuild(&languages, &tasks).await?;
        }

        match collect_candidates(&self.catalog, &languages, &tasks) {
            Ok(model_ids) => Ok(model_ids),
            Err(missing) => {
                tracing::debug!(key = %missing, "Catalog bucket missing, rebuilding model catalog");
                self.catalog.rebuild(&languages, &tasks).await?;
                collect_candidates(&self.catalog, &languages, &tasks)
                    .map_err(|key| ScandevalError::MissingCatalogKey(key.to_string()))
            }
        }
    }

    /// Run every (dataset, model) pair, skipping incompatible models
    async fn run_pairs(
        &mut self,
        datasets: &[Registration],
        model_ids: &[String],
        run_config: &RunConfig,
    ) -> ScandevalResult<()> {
        for registration in datasets {
            for model_id in model_ids {
                tracing::info!(
                    dataset = %registration.key,
                    model_id = %model_id,
                    "Benchmarking {} on {}",
                    model_id,
                    registration.alias
                );

                match registration.runner.benchmark(model_id, run_config).await {
                    Ok(result) => {
                        tracing::debug!(
                            dataset = %registration.key,
                            model_id = %model_id,
                            results = %result.as_value(),
                            "Benchmark finished"
                        );
                        self.results.record(&registration.key, model_id, result);
                        crate::metrics::record_pair_benchmarked(&registration.key);
                    }
                    Err(e) if e.is_incompatible_model() => {
                        tracing::info!(
                            dataset = %registration.key,
                            model_id = %model_id,
                            "{} could not be benchmarked on {}. Skipping.",
                            model_id,
                            registration.alias
                        );
                        tracing::debug!(error = %e, "Benchmark skipped");
                        crate::metrics::record_pair_skipped(&registration.key);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }
}

fn validate(config: &BenchmarkConfig) -> ScandevalResult<()> {
    config
        .validate()
        .map_err(|e| ScandevalError::Config(format!("{:#}", e)))
}

/// Union the language, task and multilingual buckets
///
/// Returns the first missing key if any bucket is absent. Each bucket is
/// sorted and IDs already taken from an earlier bucket are skipped.
fn collect_candidates(
    cache: &CatalogCache,
    languages: &[Filter],
    tasks: &[Filter],
) -> Result<Vec<String>, CatalogKey> {
    let keys = languages
        .iter()
        .cloned()
        .map(CatalogKey::Language)
        .chain(tasks.iter().cloned().map(CatalogKey::Task))
        .chain(std::iter::once(CatalogKey::Multilingual));

    let mut seen = HashSet::new();
    let mut model_ids = Vec::new();

    for key in keys {
        let Some(bucket) = cache.get(&key) else {
            return Err(key);
        };
        let mut bucket: Vec<&String> = bucket.iter().collect();
        bucket.sort();
        for model_id in bucket {
            if seen.insert(model_id.as_str()) {
                model_ids.push(model_id.clone());
            }
        }
    }

    Ok(model_ids)
}
