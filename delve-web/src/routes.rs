//! Route definitions for the Delve web server

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/research", post(handlers::research))
        .route("/openapi.json", get(openapi::openapi_json))
}
