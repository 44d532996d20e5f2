//! Model catalog queries against the HuggingFace Hub
//!
//! The hub listing is treated as a best-effort, un-paginated source: one
//! request per (language, task) pair, whatever the first page returns.

use crate::config::CatalogConfig;
use crate::error::{ScandevalError, ScandevalResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

// ============================================================================
// Trait Definitions
// ============================================================================

/// A filterable, read-only index of hosted models
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Model IDs matching the given language and task
    ///
    /// `None` on either axis means "do not filter on it".
    async fn model_ids(
        &self,
        language: Option<&str>,
        task: Option<&str>,
    ) -> ScandevalResult<Vec<String>>;
}

// ============================================================================
// Production Implementation
// ============================================================================

/// Catalog source backed by the hub's model listing endpoint
pub struct HubCatalogSource {
    config: CatalogConfig,
    http_client: reqwest::Client,
}

/// One entry of the listing response (partial)
#[derive(Debug, Deserialize)]
struct ListedModel {
    id: Option<String>,
    #[serde(rename = "modelId")]
    model_id: Option<String>,
}

impl HubCatalogSource {
    /// Create a new hub client
    pub fn new(config: CatalogConfig) -> ScandevalResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("scandeval/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScandevalError::Catalog(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Listing URL for the configured hub
    fn listing_url(&self) -> String {
        format!("{}/api/models", self.config.endpoint.trim_end_matches('/'))
    }

    /// Query parameters for one listing request
    fn query_params(&self, language: Option<&str>, task: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(language) = language {
            params.push(("filter", language.to_string()));
        }
        if let Some(task) = task {
            params.push(("pipeline_tag", task.to_string()));
        }
        if let Some(limit) = self.config.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[async_trait]
impl CatalogSource for HubCatalogSource {
    async fn model_ids(
        &self,
        language: Option<&str>,
        task: Option<&str>,
    ) -> ScandevalResult<Vec<String>> {
        let url = self.listing_url();
        let params = self.query_params(language, task);

        tracing::debug!(url = %url, language = ?language, task = ?task, "Querying model catalog");

        let response = self.http_client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(ScandevalError::Catalog(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        let listed: Vec<ListedModel> = response.json().await?;
        let model_ids = extract_model_ids(listed);

        tracing::debug!(
            language = ?language,
            task = ?task,
            count = model_ids.len(),
            "Model catalog query returned"
        );

        Ok(model_ids)
    }
}

/// Pull model IDs out of listing entries, skipping entries without one
fn extract_model_ids(listed: Vec<ListedModel>) -> Vec<String> {
    listed
        .into_iter()
        .filter_map(|entry| entry.id.or(entry.model_id))
        .filter(|id| !id.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_with(config: CatalogConfig) -> HubCatalogSource {
        HubCatalogSource::new(config).unwrap()
    }

    #[test]
    fn test_listing_url_trims_trailing_slash() {
        let source = source_with(CatalogConfig {
            endpoint: "https://hub.example.org/".to_string(),
            ..Default::default()
        });
        assert_eq!(source.listing_url(), "https://hub.example.org/api/models");
    }

    #[test]
    fn test_query_params_omit_unfiltered_axes() {
        let source = source_with(CatalogConfig::default());
        assert!(source.query_params(None, None).is_empty());

        let params = source.query_params(Some("da"), None);
        assert_eq!(params, vec![("filter", "da".to_string())]);

        let params = source.query_params(None, Some("fill-mask"));
        assert_eq!(params, vec![("pipeline_tag", "fill-mask".to_string())]);
    }

    #[test]
    fn test_query_params_include_limit() {
        let source = source_with(CatalogConfig {
            limit: Some(30),
            ..Default::default()
        });
        let params = source.query_params(Some("sv"), Some("token-classification"));
        assert_eq!(
            params,
            vec![
                ("filter", "sv".to_string()),
                ("pipeline_tag", "token-classification".to_string()),
                ("limit", "30".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_model_ids() {
        let listed: Vec<ListedModel> = serde_json::from_str(
            r#"[
                {"id": "Maltehb/danish-bert-botxo", "likes": 3},
                {"modelId": "KB/bert-base-swedish-cased"},
                {"private": false},
                {"id": ""}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            extract_model_ids(listed),
            vec!["Maltehb/danish-bert-botxo", "KB/bert-base-swedish-cased"]
        );
    }

    #[tokio::test]
    async fn test_unreachable_hub_is_catalog_error() {
        let source = source_with(CatalogConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        });

        let err = source.model_ids(Some("da"), None).await.unwrap_err();
        assert!(matches!(err, ScandevalError::Catalog(_)));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_query_live_hub() {
        let source = source_with(CatalogConfig {
            limit: Some(5),
            ..Default::default()
        });
        let ids = source.model_ids(Some("da"), Some("fill-mask")).await.unwrap();
        assert!(!ids.is_empty());
    }
}
