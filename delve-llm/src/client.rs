//! LLM client integration using siumai
//!
//! One client per research run. Every call sends a system message and a user
//! message at the configured temperature; there is no retry here.

use async_trait::async_trait;
use delve_core::{
    missing_credential_error, DelveError, DelveResult, ErrorContext, Generator, LlmConfig,
};
use siumai::models;
use siumai::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// OpenAI-protocol endpoint used for the openrouter provider
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model used when the configuration leaves it unset
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        "gemini" => "gemini-2.0-flash",
        "openrouter" => "anthropic/claude-3-opus:beta",
        "openai" => models::openai::GPT_4O_MINI,
        "anthropic" => models::anthropic::CLAUDE_HAIKU_3_5,
        "groq" => "llama-3.1-8b-instant",
        _ => "llama3.2",
    }
}

/// Fully resolved provider settings, ready to build a client from
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ProviderSettings {
    /// Resolve against the process environment
    pub fn resolve(config: &LlmConfig) -> DelveResult<Self> {
        Self::resolve_with(config, |name| {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        })
    }

    /// Resolve model, credential and endpoint; a missing key is a configuration error
    pub fn resolve_with<F>(config: &LlmConfig, lookup: F) -> DelveResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = config.provider.as_str();
        if !delve_core::SUPPORTED_PROVIDERS.contains(&provider) {
            return Err(DelveError::Config {
                message: format!("Unsupported LLM provider: {}", provider),
                source: None,
                context: ErrorContext::new("llm_client")
                    .with_operation("resolve_provider")
                    .with_suggestion(&format!(
                        "Use one of: {}",
                        delve_core::SUPPORTED_PROVIDERS.join(", ")
                    )),
            });
        }

        let api_key = match config.credential_var() {
            Some(var) => Some(
                config
                    .api_key
                    .clone()
                    .or_else(|| lookup(var))
                    .ok_or_else(|| missing_credential_error!(var, "llm_client"))?,
            ),
            None => None,
        };

        let base_url = match provider {
            "openrouter" => Some(
                config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
            ),
            "ollama" => Some(
                config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ),
            _ => config.base_url.clone(),
        };

        Ok(Self {
            provider: provider.to_string(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| default_model(provider).to_string()),
            api_key,
            base_url,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

/// Generation capability backed by a siumai client
pub struct LlmGenerator {
    client: Box<dyn LlmClient>,
    settings: ProviderSettings,
}

impl LlmGenerator {
    /// Create a new generator; fails before any network call when the key is missing
    pub async fn new(config: &LlmConfig) -> DelveResult<Self> {
        let settings = ProviderSettings::resolve(config)?;
        let client = Self::build_client(&settings).await?;

        info!(
            "Created LLM client for provider: {} with model: {}",
            settings.provider, settings.model
        );

        Ok(Self { client, settings })
    }

    /// Build the appropriate siumai client based on configuration
    async fn build_client(settings: &ProviderSettings) -> DelveResult<Box<dyn LlmClient>> {
        let api_key = settings.api_key.clone().unwrap_or_default();
        let build_error = |e: LlmError| DelveError::Config {
            message: format!("Failed to build {} client: {}", settings.provider, e),
            source: None,
            context: ErrorContext::new("llm_client")
                .with_operation("build_client")
                .with_metadata("model", &settings.model),
        };

        match settings.provider.as_str() {
            "gemini" => {
                let mut builder = LlmBuilder::new()
                    .gemini()
                    .api_key(&api_key)
                    .model(&settings.model)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens as i32);
                }

                let client = builder.build().await.map_err(build_error)?;
                Ok(Box::new(client))
            }
            // OpenRouter speaks the OpenAI protocol
            "openai" | "openrouter" => {
                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&settings.model)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                if let Some(base_url) = &settings.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder.build().await.map_err(build_error)?;
                Ok(Box::new(client))
            }
            "anthropic" => {
                let mut builder = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&settings.model)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(build_error)?;
                Ok(Box::new(client))
            }
            "ollama" => {
                let base_url = settings
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

                let mut builder = LlmBuilder::new()
                    .ollama()
                    .model(&settings.model)
                    .base_url(&base_url)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(build_error)?;
                Ok(Box::new(client))
            }
            "groq" => {
                let mut builder = LlmBuilder::new()
                    .groq()
                    .api_key(&api_key)
                    .model(&settings.model)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(build_error)?;
                Ok(Box::new(client))
            }
            provider => Err(delve_core::config_error!(
                format!("Unsupported LLM provider: {}", provider),
                "llm_client"
            )),
        }
    }

    /// Settings this generator was built with
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn generation_error(&self, message: String) -> DelveError {
        DelveError::Generation {
            message,
            provider: Some(self.settings.provider.clone()),
            source: None,
            context: ErrorContext::new("llm_client")
                .with_operation("generate")
                .with_metadata("model", &self.settings.model),
        }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, prompt: &str, system_prompt: &str) -> DelveResult<String> {
        let start_time = Instant::now();
        let messages = vec![system!(system_prompt), user!(prompt)];

        debug!(
            provider = %self.settings.provider,
            prompt_chars = prompt.len(),
            "Sending generation request"
        );

        let response = self
            .client
            .chat(messages)
            .await
            .map_err(|e| self.generation_error(format!("LLM generation failed: {}", e)))?;

        match response.content_text() {
            Some(content) if !content.trim().is_empty() => {
                info!(
                    "Generated response in {:?} ({} chars)",
                    start_time.elapsed(),
                    content.len()
                );
                Ok(content.to_string())
            }
            // Callers parse the reply and fall back on their own defaults
            _ => {
                warn!(
                    provider = %self.settings.provider,
                    "LLM response carried no text content"
                );
                Ok(String::new())
            }
        }
    }

    fn name(&self) -> &str {
        &self.settings.provider
    }
}
