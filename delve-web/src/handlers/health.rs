//! Health check handlers

use super::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, response::Json};

/// Health check endpoint
///
/// Reports which providers live research runs would use and whether their
/// credentials were found. A server missing credentials is still healthy;
/// only its live research requests fail.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Server status and the providers live research requests use",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let services = &state.services;
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_provider: services.llm_provider().to_string(),
        search_provider: services.search_provider().to_string(),
        credentials_configured: services.missing_credentials().is_empty(),
    })
}
