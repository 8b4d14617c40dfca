//! Shared HTTP plumbing

use delve_core::{DelveError, DelveResult, ErrorContext};

/// Build a reqwest client with the user agent and timeout applied
pub(crate) fn create_http_client(
    user_agent: &str,
    timeout_seconds: u64,
) -> DelveResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(user_agent).map_err(|e| DelveError::Config {
            message: format!("Invalid user agent: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?,
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| DelveError::Config {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?;

    Ok(client)
}

/// Turn a non-success response into a search error
pub(crate) async fn handle_response_error(
    response: reqwest::Response,
    query: &str,
    operation: &str,
) -> DelveError {
    let status = response.status();
    let url = response.url().clone();

    let error_body = response.text().await.unwrap_or_default();

    DelveError::Search {
        message: format!(
            "HTTP {} error for {}: {}",
            status.as_u16(),
            url,
            if error_body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error")
            } else {
                &error_body
            }
        ),
        query: Some(query.to_string()),
        source: None,
        context: ErrorContext::new("search_client")
            .with_operation(operation)
            .with_metadata("status", &status.as_u16().to_string())
            .with_suggestion(match status.as_u16() {
                401 | 403 => "Check your TAVILY_API_KEY",
                429 => "Search rate limit reached; lower research.max_searches_total",
                _ => "Check network connectivity and API status",
            }),
    }
}
