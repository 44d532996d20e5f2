//! Model catalog module
//!
//! Provides functionality for:
//! - Querying the HuggingFace Hub for models by language and task
//! - Caching the results in buckets keyed by language, task, `all` and `multilingual`
//! - Rebuilding the whole catalog when a requested bucket is missing

pub mod cache;
pub mod source;

pub use cache::{CatalogCache, CatalogKey, MULTILINGUAL_MODELS, ModelCatalog};
pub use source::{CatalogSource, HubCatalogSource};
