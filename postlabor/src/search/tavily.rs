use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::{PostlaborError, Result};
use crate::models::SearchResult;
use crate::search::WebSearcher;

/// Tavily web search adapter.
#[derive(Clone)]
pub struct TavilyClient {
    api_key: Option<String>,
    endpoint: String,
    search_depth: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    published_date: Option<String>,
}

impl From<TavilyResult> for SearchResult {
    fn from(r: TavilyResult) -> Self {
        Self {
            title: r.title,
            url: r.url,
            content: r.content,
            published_date: r.published_date,
        }
    }
}

impl TavilyClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PostlaborError::Search(format!("Failed to create search client: {e}")))?;

        Ok(Self {
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            endpoint: format!("{}/search", config.base_url.trim_end_matches('/')),
            search_depth: config.search_depth.clone(),
            client,
        })
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl WebSearcher for TavilyClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchResult>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PostlaborError::SearchUnavailable("TAVILY_API_KEY is not set".into()))?;

        let request = TavilySearchRequest {
            api_key,
            query,
            max_results,
            search_depth: &self.search_depth,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostlaborError::Search(format!(
                "Tavily returned HTTP {status}"
            )));
        }

        let body: TavilySearchResponse = response
            .json()
            .await
            .map_err(|e| PostlaborError::Search(format!("Invalid Tavily response: {e}")))?;

        let results: Vec<SearchResult> = body.results.into_iter().map(SearchResult::from).collect();
        tracing::debug!(query, count = results.len(), "Tavily search completed");

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_unavailable() {
        let config = SearchConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        let client = TavilyClient::new(&config).unwrap();
        assert!(!client.is_available());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = SearchConfig {
            base_url: "http://localhost:9999/".to_string(),
            ..Default::default()
        };
        let client = TavilyClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/search");
    }

    #[tokio::test]
    async fn test_search_without_key_fails_fast() {
        let client = TavilyClient::new(&SearchConfig::default()).unwrap();
        let result = client.search("robot tax", 5).await;
        assert!(matches!(result, Err(PostlaborError::SearchUnavailable(_))));
    }
}
