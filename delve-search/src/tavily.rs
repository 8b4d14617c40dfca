//! Tavily search client

use async_trait::async_trait;
use delve_core::{
    missing_credential_error, DelveError, DelveResult, ErrorContext, SearchConfig, SearchHit,
    SearchProvider, TAVILY_API_KEY_VAR,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::http::{create_http_client, handle_response_error};

/// Resolved client settings
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub base_url: String,
    pub api_key: String,
    pub search_depth: String,
    pub max_results: u32,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl TavilyConfig {
    /// Resolve from the search section; the key falls back to `TAVILY_API_KEY`
    pub fn from_search_config(config: &SearchConfig) -> DelveResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| {
                std::env::var(TAVILY_API_KEY_VAR)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
            })
            .ok_or_else(|| missing_credential_error!(TAVILY_API_KEY_VAR, "tavily_client"))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            search_depth: config.search_depth.clone(),
            max_results: config.max_results,
            timeout_seconds: config.timeout_seconds,
            user_agent: format!("delve/{}", env!("CARGO_PKG_VERSION")),
        })
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Search capability backed by the Tavily API
pub struct TavilyClient {
    client: reqwest::Client,
    config: TavilyConfig,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> DelveResult<Self> {
        let client = create_http_client(&config.user_agent, config.timeout_seconds)?;

        info!("Created Tavily client for {}", config.base_url);

        Ok(Self { client, config })
    }

    /// Build from the `search` config section
    pub fn from_search_config(config: &SearchConfig) -> DelveResult<Self> {
        Self::new(TavilyConfig::from_search_config(config)?)
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> DelveResult<Vec<SearchHit>> {
        let url = self.endpoint();
        debug!("Making Tavily search request to {} for {:?}", url, query);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&TavilyRequest {
                query,
                search_depth: &self.config.search_depth,
                max_results: self.config.max_results,
            })
            .send()
            .await
            .map_err(|e| DelveError::Search {
                message: format!("Failed to reach Tavily API: {}", e),
                query: Some(query.to_string()),
                source: Some(Box::new(e)),
                context: ErrorContext::new("tavily_client").with_operation("search"),
            })?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, query, "tavily_search").await);
        }

        let body: TavilyResponse = response.json().await.map_err(|e| DelveError::Search {
            message: format!("Failed to parse Tavily response: {}", e),
            query: Some(query.to_string()),
            source: Some(Box::new(e)),
            context: ErrorContext::new("tavily_client").with_operation("decode_response"),
        })?;

        info!("Tavily returned {} results for {:?}", body.results.len(), query);
        Ok(body.results)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_builds_client() {
        let config = SearchConfig {
            api_key: Some("tvly-test".to_string()),
            base_url: "http://localhost:9/".to_string(),
            ..SearchConfig::default()
        };
        let client = TavilyClient::from_search_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/search");
        assert_eq!(client.config.search_depth, "advanced");
        assert_eq!(client.config.max_results, 5);
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(TavilyRequest {
            query: "rust",
            search_depth: "advanced",
            max_results: 5,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"query": "rust", "search_depth": "advanced", "max_results": 5})
        );
    }
}
