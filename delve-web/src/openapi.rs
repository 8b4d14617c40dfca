//! OpenAPI specification for the Delve web server

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{
    HealthResponse, OutputFormat, ResearchRequest, ResearchResponse, ResponseStatus,
};
use delve_research::{CompletionStats, ProgressRecord, TerminationReason};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Delve Web API",
        version = "0.1.0",
        description = "Iterative web research that ends in a cited report",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::research,
    ),
    components(
        schemas(
            HealthResponse,
            OutputFormat,
            ResearchRequest,
            ResearchResponse,
            ResponseStatus,
            CompletionStats,
            ProgressRecord,
            TerminationReason,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Research", description = "Research queries and reports")
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
