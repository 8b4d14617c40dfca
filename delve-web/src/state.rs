//! Application state shared by the handlers

use crate::{WebConfig, WebResult};
use async_trait::async_trait;
use delve_core::{DelveConfig, DelveResult};
use delve_report::ReportWriter;
use delve_research::ResearchService;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds a fresh research service for one request
#[async_trait]
pub trait ServiceFactory: Send + Sync {
    async fn build(&self, test_mode: bool) -> DelveResult<ResearchService>;

    /// Generation provider behind live requests
    fn llm_provider(&self) -> &str;

    fn search_provider(&self) -> &str {
        "tavily"
    }

    /// Credential variables live requests still need
    fn missing_credentials(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

/// Wires the configured LLM provider and Tavily for every request
pub struct ConfiguredServices {
    config: DelveConfig,
}

impl ConfiguredServices {
    pub fn new(config: DelveConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ServiceFactory for ConfiguredServices {
    async fn build(&self, test_mode: bool) -> DelveResult<ResearchService> {
        if test_mode {
            return Ok(ResearchService::test_mode());
        }
        ResearchService::from_config(&self.config).await
    }

    fn llm_provider(&self) -> &str {
        &self.config.llm.provider
    }

    fn missing_credentials(&self) -> Vec<&'static str> {
        self.config.missing_credentials()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: WebConfig,
    pub services: Arc<dyn ServiceFactory>,
    pub writer: ReportWriter,
}

impl AppState {
    /// Load the delve configuration named by `config`, filling credentials from the environment
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let mut delve = match &config.config_path {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                DelveConfig::from_file(path)?
            }
            None => DelveConfig::default(),
        };
        delve.apply_env();

        if let Err(e) = delve.validate() {
            warn!("Configuration is invalid, live research requests will fail: {}", e);
        }

        let writer = ReportWriter::from_output_config(&delve.output);
        Ok(Self::with_services(
            config,
            Arc::new(ConfiguredServices::new(delve)),
            writer,
        ))
    }

    pub fn with_services(
        config: WebConfig,
        services: Arc<dyn ServiceFactory>,
        writer: ReportWriter,
    ) -> Self {
        Self {
            config,
            services,
            writer,
        }
    }
}
