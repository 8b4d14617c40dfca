//! Core trait definitions

use crate::error::DelveResult;
use crate::types::SearchHit;
use async_trait::async_trait;

/// Text-generation capability
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce text for `prompt` under `system_prompt`
    async fn generate(&self, prompt: &str, system_prompt: &str) -> DelveResult<String>;

    /// Short provider label used in logs
    fn name(&self) -> &str {
        "generator"
    }
}

/// Web-search capability
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search call
    async fn search(&self, query: &str) -> DelveResult<Vec<SearchHit>>;

    fn name(&self) -> &str {
        "search"
    }
}
