//! Delve Web Server
//!
//! Request/response HTTP interface over the research service.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::DelveServer;
pub use state::{AppState, ConfiguredServices, ServiceFactory};

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    Router,
};
use delve_core::{DelveConfig, LoggingConfig};
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Delve TOML configuration file; defaults and environment when absent
    pub config_path: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            config_path: None,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("DELVE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("DELVE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            dev_mode: std::env::var("DELVE_DEV_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            config_path: std::env::var("DELVE_CONFIG").ok().map(PathBuf::from),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] delve_core::DelveError),

    #[error("Logging error: {0}")]
    Logging(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Logging settings for the server
///
/// Starts from the `[logging]` section of the delve configuration file and adds
/// the web and HTTP targets. `level`, when given, replaces the console level.
pub fn logging_config(config: &WebConfig, level: Option<&str>) -> WebResult<LoggingConfig> {
    let mut logging = match &config.config_path {
        Some(path) => DelveConfig::from_file(path)?.logging,
        None => LoggingConfig::default(),
    };

    for directive in ["delve_web=info", "tower_http=debug"] {
        let target = directive.split('=').next().unwrap_or(directive);
        if !logging.filter_directives.iter().any(|d| d.starts_with(target)) {
            logging.filter_directives.push(directive.to_string());
        }
    }
    if let Some(level) = level {
        logging = logging.with_level(level);
    }
    Ok(logging)
}

/// Initialize logging for the web server
pub fn init_logging(logging: &LoggingConfig) -> WebResult<()> {
    delve_core::init_logging(logging).map_err(|e| WebError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn logging_comes_from_the_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("delve.toml");
        std::fs::write(
            &path,
            "[logging]\nlog_to_file = true\nlog_file_path = \"logs/web.log\"\n",
        )
        .unwrap();
        let config = WebConfig {
            config_path: Some(path),
            ..WebConfig::default()
        };

        let logging = logging_config(&config, Some("warn")).unwrap();
        assert!(logging.log_to_file);
        assert_eq!(logging.log_file_path.as_deref(), Some("logs/web.log"));
        assert_eq!(logging.level, "warn");
        assert!(logging.filter_directives.contains(&"delve_web=warn".to_string()));
        assert!(logging.filter_directives.contains(&"tower_http=debug".to_string()));
    }

    #[test]
    fn defaults_without_a_config_file() {
        let logging = logging_config(&WebConfig::default(), None).unwrap();
        assert!(!logging.log_to_file);
        assert_eq!(logging.level, "info");
        assert!(logging.filter_directives.contains(&"delve_web=info".to_string()));
    }
}
