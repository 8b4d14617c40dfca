//! Research request handler

use super::types::{OutputFormat, ResearchRequest, ResearchResponse, ResponseStatus};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json, Json as JsonExtractor};
use delve_report::{render_document, ReportKind};
use tracing::{error, info};

/// Run one research query and save the report
///
/// Failures inside the run come back with HTTP 200 and `status: "error"`.
#[utoipa::path(
    post,
    path = "/api/research",
    tag = "Research",
    summary = "Research a query",
    description = "Run the research loop for a query and return the cited report",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Report generated or run failed", body = ResearchResponse),
        (status = 400, description = "Empty query", body = ResearchResponse)
    )
)]
pub async fn research(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ResearchRequest>,
) -> (StatusCode, Json<ResearchResponse>) {
    let query = request.query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ResearchResponse::error("query must not be empty")),
        );
    }

    info!(
        "Research request: {} (format: {:?}, test_mode: {})",
        query, request.format, request.test_mode
    );

    let service = match state.services.build(request.test_mode).await {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to set up research service: {}", e);
            return (StatusCode::OK, Json(ResearchResponse::error(e)));
        }
    };

    let report = match service.research(query).await {
        Ok(report) => report,
        Err(e) => {
            error!("Error processing request: {}", e);
            return (StatusCode::OK, Json(ResearchResponse::error(e)));
        }
    };

    let saved = match request.format {
        OutputFormat::Markdown => {
            state
                .writer
                .persist(&report.markdown, ReportKind::Markdown)
                .await
        }
        OutputFormat::Html => {
            state
                .writer
                .persist(&render_document(&report.markdown), ReportKind::Html)
                .await
        }
    };
    let file_path = match saved {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to save report: {}", e);
            return (StatusCode::OK, Json(ResearchResponse::error(e)));
        }
    };

    let (stats, termination) = if report.test_mode {
        (None, None)
    } else {
        (Some(report.stats), report.termination)
    };

    (
        StatusCode::OK,
        Json(ResearchResponse {
            response: report.markdown,
            file_path: Some(file_path.display().to_string()),
            status: ResponseStatus::Success,
            stats,
            termination,
        }),
    )
}
