//! ScandEval - Scandinavian language model benchmarking
//!
//! Discovers candidate models on the HuggingFace Hub, fine-tunes and evaluates
//! them on a fixed battery of Danish datasets and accumulates the scores in a
//! nested results store.

pub mod benchmark;
pub mod catalog;
pub mod config;
pub mod datasets;
pub mod error;
pub mod metrics;
pub mod results;
pub mod selection;

pub use benchmark::{Benchmark, BenchmarkRequest};
pub use catalog::{CatalogCache, CatalogKey, CatalogSource, HubCatalogSource, ModelCatalog};
pub use config::{BenchmarkConfig, CatalogConfig, RunOverrides, RunnerConfig};
pub use datasets::{BenchmarkRunner, DatasetRegistry, Registration, RunConfig, RunResult};
pub use error::{ScandevalError, ScandevalResult};
pub use results::ResultsStore;
pub use selection::{Filter, FilterSelection, Selection};
