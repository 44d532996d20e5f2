//! Multi-key cache of the model catalog
//!
//! Buckets are keyed by language filter, task filter, the umbrella `all`
//! bucket and the hand-maintained `multilingual` bucket. A lookup miss is
//! answered by rebuilding the whole catalog, never by patching one bucket.

use super::source::CatalogSource;
use crate::error::ScandevalResult;
use crate::selection::Filter;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Multilingual models that the per-language filters do not surface
pub const MULTILINGUAL_MODELS: [&str; 2] = ["xlm-roberta-base", "xlm-roberta-large"];

/// Key of one catalog bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    /// Every model seen during the build
    All,
    /// The injected multilingual models
    Multilingual,
    Language(Filter),
    Task(Filter),
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Multilingual => write!(f, "multilingual"),
            Self::Language(filter) => write!(f, "language:{}", filter),
            Self::Task(filter) => write!(f, "task:{}", filter),
        }
    }
}

/// A built catalog: bucket key -> deduplicated model IDs
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    buckets: HashMap<CatalogKey, HashSet<String>>,
}

impl ModelCatalog {
    /// Query the source for every (language, task) pair and bucket the results
    pub async fn build(
        source: &dyn CatalogSource,
        languages: &[Filter],
        tasks: &[Filter],
    ) -> ScandevalResult<Self> {
        tracing::info!("{}", fetch_message(languages, tasks));

        let mut catalog = Self::default();
        catalog.buckets.entry(CatalogKey::All).or_default();

        for language in languages {
            for task in tasks {
                let model_ids = source.model_ids(language.as_code(), task.as_code()).await?;

                tracing::debug!(
                    language = %language,
                    task = %task,
                    count = model_ids.len(),
                    "Fetched model list"
                );

                catalog.extend(CatalogKey::All, &model_ids);
                catalog.extend(CatalogKey::Language(language.clone()), &model_ids);
                catalog.extend(CatalogKey::Task(task.clone()), &model_ids);
            }
        }

        let multilingual: Vec<String> = MULTILINGUAL_MODELS.iter().map(|m| m.to_string()).collect();
        catalog.extend(CatalogKey::All, &multilingual);
        catalog.buckets.insert(
            CatalogKey::Multilingual,
            multilingual.into_iter().collect(),
        );

        Ok(catalog)
    }

    fn extend(&mut self, key: CatalogKey, model_ids: &[String]) {
        self.buckets
            .entry(key)
            .or_default()
            .extend(model_ids.iter().cloned());
    }

    /// Model IDs in one bucket, `None` if the bucket was never built
    pub fn get(&self, key: &CatalogKey) -> Option<&HashSet<String>> {
        self.buckets.get(key)
    }

    pub fn contains_key(&self, key: &CatalogKey) -> bool {
        self.buckets.contains_key(key)
    }

    /// All bucket keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &CatalogKey> {
        self.buckets.keys()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Human-readable description of what is about to be fetched
fn fetch_message(languages: &[Filter], tasks: &[Filter]) -> String {
    let any_language = languages.iter().any(Filter::is_unfiltered);
    let any_task = tasks.iter().any(Filter::is_unfiltered);

    let mut msg = String::from("Fetching list of models");
    if !any_language {
        msg.push_str(&format!(" for the languages {}", join(languages)));
        if !any_task {
            msg.push_str(&format!(" and tasks {}", join(tasks)));
        }
    } else if !any_task {
        msg.push_str(&format!(" for the tasks {}", join(tasks)));
    }
    msg.push_str(" from the HuggingFace Hub.");
    msg
}

fn join(filters: &[Filter]) -> String {
    let parts: Vec<String> = filters.iter().map(|f| format!("'{}'", f)).collect();
    format!("[{}]", parts.join(", "))
}

/// Lazily built, instance-scoped catalog with explicit rebuild
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    catalog: Option<ModelCatalog>,
    rebuilds: usize,
}

impl CatalogCache {
    /// Create an empty cache; nothing is fetched until the first rebuild
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            catalog: None,
            rebuilds: 0,
        }
    }

    /// Whether a catalog has been built yet
    pub fn is_populated(&self) -> bool {
        self.catalog.is_some()
    }

    /// Look up one bucket in the current catalog
    pub fn get(&self, key: &CatalogKey) -> Option<&HashSet<String>> {
        self.catalog.as_ref().and_then(|c| c.get(key))
    }

    /// The current catalog, if any
    pub fn catalog(&self) -> Option<&ModelCatalog> {
        self.catalog.as_ref()
    }

    /// Replace the cached catalog with a freshly fetched one
    ///
    /// On a fetch failure the previous catalog is kept.
    pub async fn rebuild(
        &mut self,
        languages: &[Filter],
        tasks: &[Filter],
    ) -> ScandevalResult<&ModelCatalog> {
        let catalog = ModelCatalog::build(self.source.as_ref(), languages, tasks).await?;
        self.rebuilds += 1;
        crate::metrics::record_catalog_rebuild();

        tracing::debug!(
            buckets = catalog.len(),
            rebuilds = self.rebuilds,
            "Model catalog rebuilt"
        );

        Ok(&*self.catalog.insert(catalog))
    }

    /// Number of completed rebuilds since construction
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScandevalError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Source answering from a fixed table and recording every query
    struct TableSource {
        queries: Mutex<Vec<(Option<String>, Option<String>)>>,
        fail: AtomicBool,
    }

    impl TableSource {
        fn new() -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            let source = Self::new();
            source.set_failing(true);
            source
        }

        fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        fn query_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CatalogSource for TableSource {
        async fn model_ids(
            &self,
            language: Option<&str>,
            task: Option<&str>,
        ) -> ScandevalResult<Vec<String>> {
            self.queries
                .lock()
                .unwrap()
                .push((language.map(String::from), task.map(String::from)));
            if self.fail.load(Ordering::SeqCst) {
                return Err(ScandevalError::Catalog("HTTP 503".to_string()));
            }
            let ids = match (language, task) {
                (Some("da"), Some("token-classification")) => vec!["da-ner", "shared"],
                (Some("da"), _) => vec!["da-bert", "da-ner", "shared"],
                (Some("sv"), _) => vec!["sv-bert", "shared"],
                (None, Some("token-classification")) => vec!["da-ner", "en-ner"],
                (None, _) => vec!["da-bert", "sv-bert", "en-bert"],
                _ => vec![],
            };
            Ok(ids.into_iter().map(String::from).collect())
        }
    }

    fn code(c: &str) -> Filter {
        Filter::Code(c.to_string())
    }

    #[tokio::test]
    async fn test_build_buckets_by_language_and_task() {
        let source = TableSource::new();
        let catalog = ModelCatalog::build(&source, &[code("da")], &[code("token-classification")])
            .await
            .unwrap();

        assert_eq!(source.query_count(), 1);
        assert_eq!(catalog.len(), 4);

        let da = catalog.get(&CatalogKey::Language(code("da"))).unwrap();
        let task = catalog
            .get(&CatalogKey::Task(code("token-classification")))
            .unwrap();
        let multilingual = catalog.get(&CatalogKey::Multilingual).unwrap();
        let all = catalog.get(&CatalogKey::All).unwrap();

        assert_eq!(da.len(), 2);
        assert_eq!(da, task);
        assert!(multilingual.contains("xlm-roberta-base"));
        assert!(multilingual.contains("xlm-roberta-large"));
        assert!(da.is_subset(all));
        assert!(multilingual.is_subset(all));
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_build_queries_cross_product_and_dedupes() {
        let source = TableSource::new();
        let catalog = ModelCatalog::build(
            &source,
            &[code("da"), code("sv")],
            &[Filter::Unfiltered, code("fill-mask")],
        )
        .await
        .unwrap();

        assert_eq!(source.query_count(), 4);

        // "shared" is returned by every query but stored once
        let all = catalog.get(&CatalogKey::All).unwrap();
        assert_eq!(
            all.iter().filter(|id| id.as_str() == "shared").count(),
            1
        );

        let unfiltered_task = catalog.get(&CatalogKey::Task(Filter::Unfiltered)).unwrap();
        assert!(unfiltered_task.contains("da-bert"));
        assert!(unfiltered_task.contains("sv-bert"));
    }

    #[tokio::test]
    async fn test_empty_query_results_still_create_buckets() {
        let source = TableSource::new();
        let catalog = ModelCatalog::build(&source, &[code("fo")], &[code("fill-mask")])
            .await
            .unwrap();

        assert!(catalog.get(&CatalogKey::Language(code("fo"))).unwrap().is_empty());
        assert!(catalog.contains_key(&CatalogKey::Task(code("fill-mask"))));
        assert_eq!(catalog.get(&CatalogKey::All).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_build_propagates_source_failure() {
        let source = TableSource::failing();
        let result = ModelCatalog::build(&source, &[code("da")], &[Filter::Unfiltered]).await;
        assert!(matches!(result, Err(ScandevalError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_cache_starts_empty_and_rebuild_replaces() {
        let source = Arc::new(TableSource::new());
        let mut cache = CatalogCache::new(source.clone());

        assert!(!cache.is_populated());
        assert!(cache.get(&CatalogKey::All).is_none());

        cache.rebuild(&[code("da")], &[Filter::Unfiltered]).await.unwrap();
        assert!(cache.is_populated());
        assert!(cache.get(&CatalogKey::Language(code("da"))).is_some());

        // A rebuild for other filters drops the old buckets
        cache.rebuild(&[code("sv")], &[Filter::Unfiltered]).await.unwrap();
        assert!(cache.get(&CatalogKey::Language(code("da"))).is_none());
        assert!(cache.get(&CatalogKey::Language(code("sv"))).is_some());
        assert_eq!(cache.rebuild_count(), 2);
        assert_eq!(source.query_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_catalog() {
        let source = Arc::new(TableSource::new());
        let mut cache = CatalogCache::new(source.clone());
        cache.rebuild(&[code("da")], &[Filter::Unfiltered]).await.unwrap();

        source.set_failing(true);
        let result = cache.rebuild(&[code("sv")], &[Filter::Unfiltered]).await;
        assert!(matches!(result, Err(ScandevalError::Catalog(_))));

        assert_eq!(cache.rebuild_count(), 1);
        assert!(cache.get(&CatalogKey::Language(code("da"))).is_some());
        assert!(cache.get(&CatalogKey::Language(code("sv"))).is_none());
    }

    #[test]
    fn test_fetch_message() {
        assert_eq!(
            fetch_message(&[code("da"), code("sv")], &[Filter::Unfiltered]),
            "Fetching list of models for the languages ['da', 'sv'] from the HuggingFace Hub."
        );
        assert_eq!(
            fetch_message(&[code("da")], &[code("fill-mask")]),
            "Fetching list of models for the languages ['da'] and tasks ['fill-mask'] from the HuggingFace Hub."
        );
        assert_eq!(
            fetch_message(&[Filter::Unfiltered], &[code("fill-mask")]),
            "Fetching list of models for the tasks ['fill-mask'] from the HuggingFace Hub."
        );
        assert_eq!(
            fetch_message(&[Filter::Unfiltered], &[Filter::Unfiltered]),
            "Fetching list of models from the HuggingFace Hub."
        );
    }

    #[test]
    fn test_catalog_key_display() {
        assert_eq!(CatalogKey::All.to_string(), "all");
        assert_eq!(CatalogKey::Multilingual.to_string(), "multilingual");
        assert_eq!(CatalogKey::Language(code("da")).to_string(), "language:da");
        assert_eq!(CatalogKey::Task(Filter::Unfiltered).to_string(), "task:any");
    }
}
