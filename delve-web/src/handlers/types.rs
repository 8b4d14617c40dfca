//! Request/response types used by the handlers

use delve_research::{CompletionStats, TerminationReason};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(example = "gemini")]
    pub llm_provider: String,
    #[schema(example = "tavily")]
    pub search_provider: String,
    /// False when live research requests would fail for a missing key
    pub credentials_configured: bool,
}

/// File format the finished report is saved in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResearchRequest {
    #[schema(example = "How does Rust's borrow checker work?")]
    pub query: String,
    #[serde(default)]
    pub format: OutputFormat,
    /// Return a sample report without calling any API
    #[serde(default)]
    pub test_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchResponse {
    /// Markdown report, or `Error: ...` on failure
    pub response: String,
    /// Saved report file
    pub file_path: Option<String>,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CompletionStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
}

impl ResearchResponse {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            response: format!("Error: {}", message),
            file_path: None,
            status: ResponseStatus::Error,
            stats: None,
            termination: None,
        }
    }
}
