//! Tavily client against an in-process HTTP server

use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use delve_core::{DelveError, SearchProvider};
use delve_search::{TavilyClient, TavilyConfig};
use serde_json::{json, Value};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: String) -> TavilyClient {
    TavilyClient::new(TavilyConfig {
        base_url,
        api_key: "tvly-secret".to_string(),
        search_depth: "advanced".to_string(),
        max_results: 5,
        timeout_seconds: 5,
        user_agent: "delve-test".to_string(),
    })
    .unwrap()
}

async fn echo_search(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer tvly-secret");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad key"})));
    }
    assert_eq!(body["search_depth"], "advanced");
    assert_eq!(body["max_results"], 5);

    let query = body["query"].as_str().unwrap_or_default().to_string();
    (
        StatusCode::OK,
        Json(json!({
            "query": query,
            "results": [
                {
                    "title": "First",
                    "url": "https://arxiv.org/abs/1",
                    "content": format!("about {}", query),
                    "published_date": "2024-05-01",
                    "score": 0.9
                },
                { "url": "https://example.com/bare" }
            ]
        })),
    )
}

#[tokio::test]
async fn search_decodes_results() {
    let base = spawn(Router::new().route("/search", post(echo_search))).await;
    let hits = client(base).search("rust ownership").await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "First");
    assert_eq!(hits[0].content, "about rust ownership");
    assert_eq!(hits[0].published_date.as_deref(), Some("2024-05-01"));
    assert_eq!(hits[1].url, "https://example.com/bare");
    assert!(hits[1].title.is_empty());
}

#[tokio::test]
async fn non_success_status_is_a_search_error() {
    let app = Router::new().route(
        "/search",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let base = spawn(app).await;

    let error = client(base).search("anything").await.unwrap_err();
    match error {
        DelveError::Search { message, query, context, .. } => {
            assert!(message.contains("502"));
            assert!(message.contains("upstream down"));
            assert_eq!(query.as_deref(), Some("anything"));
            assert_eq!(context.metadata.get("status").map(String::as_str), Some("502"));
        }
        other => panic!("Expected Search error, got {}", other),
    }
}

#[tokio::test]
async fn undecodable_body_is_a_search_error() {
    let app = Router::new().route("/search", post(|| async { "not json" }));
    let base = spawn(app).await;

    let error = client(base).search("anything").await.unwrap_err();
    assert!(error.is_fatal_to_run());
    assert!(error.to_string().contains("Failed to parse Tavily response"));
}
