//! Delve Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct DelveServer {
    config: WebConfig,
    state: AppState,
}

impl DelveServer {
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Serve until the process is stopped
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Delve Web Server");
        info!("📍 Server address: http://{}", address);
        info!("🔧 Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for DelveServer
pub struct DelveServerBuilder {
    config: WebConfig,
}

impl DelveServerBuilder {
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: WebConfig) -> Self {
        Self { config }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Delve TOML configuration file
    pub fn config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.config_path = Some(path.into());
        self
    }

    pub async fn build(self) -> WebResult<DelveServer> {
        DelveServer::new(self.config).await
    }
}

impl Default for DelveServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
