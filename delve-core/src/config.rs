//! Configuration management

use crate::error::{DelveError, DelveResult, ErrorContext};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Providers the generation capability can be built for
pub const SUPPORTED_PROVIDERS: &[&str] = &[
    "gemini",
    "openrouter",
    "openai",
    "anthropic",
    "ollama",
    "groq",
];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Environment variable holding the search credential
pub const TAVILY_API_KEY_VAR: &str = "TAVILY_API_KEY";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DelveConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub research: BudgetConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Generation provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    /// Falls back to the provider's default model when unset
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            api_key: None,
            base_url: None,
            temperature: 0.1,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    /// Environment variable that carries this provider's key, if it needs one
    pub fn credential_var(&self) -> Option<&'static str> {
        match self.provider.as_str() {
            "gemini" => Some("GEMINI_API_KEY"),
            "openrouter" => Some("OPENROUTER_API_KEY"),
            "openai" => Some("OPENAI_API_KEY"),
            "anthropic" => Some("ANTHROPIC_API_KEY"),
            "groq" => Some("GROQ_API_KEY"),
            _ => None,
        }
    }
}

/// Web search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// `basic` or `advanced`
    pub search_depth: String,
    pub max_results: u32,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            search_depth: "advanced".to_string(),
            max_results: 5,
            timeout_seconds: 30,
        }
    }
}

/// Budgets and thresholds of the research loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Ceiling on search calls for one query
    pub max_searches_total: usize,
    /// How many times one research item may be strategized
    pub max_attempts_per_item: usize,
    /// Accepted results after which an item stops issuing queries
    pub min_results_per_item: usize,
    /// Queries kept from one strategist call
    pub max_queries_per_item: usize,
    /// Shorter content is never admitted to the evidence store
    pub min_content_chars: usize,
    /// Accepted results must be longer than this for an item to stop early
    pub detailed_content_chars: usize,
    /// Distinct shared words that make a document substantial for an item
    pub depth_min_overlap: usize,
    /// A substantial document must be longer than this
    pub depth_min_chars: usize,
    /// Substantial documents that make an item sufficiently deep
    pub depth_min_documents: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_searches_total: 30,
            max_attempts_per_item: 2,
            min_results_per_item: 3,
            max_queries_per_item: 3,
            min_content_chars: 100,
            detailed_content_chars: 200,
            depth_min_overlap: 2,
            depth_min_chars: 300,
            depth_min_documents: 2,
        }
    }
}

/// Output format of a finished report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Markdown,
    Html,
    Both,
}

/// Where and how finished reports are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub reports_dir: String,
    pub format: ReportFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: "generated_reports".to_string(),
            format: ReportFormat::Markdown,
        }
    }
}

impl DelveConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DelveResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DelveError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: DelveConfig = toml::from_str(&content).map_err(|e| DelveError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DelveResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| DelveError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| DelveError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Fill credentials that the file left empty from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()));
    }

    /// Fill empty credentials from `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.llm.api_key.is_none() {
            if let Some(var) = self.llm.credential_var() {
                self.llm.api_key = lookup(var);
            }
        }
        if self.search.api_key.is_none() {
            self.search.api_key = lookup(TAVILY_API_KEY_VAR);
        }
    }

    /// Validate configuration
    /// Environment variables of credentials that are still unset
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if let Some(var) = self.llm.credential_var() {
            if self.llm.api_key.is_none() {
                missing.push(var);
            }
        }
        if self.search.api_key.is_none() {
            missing.push(TAVILY_API_KEY_VAR);
        }
        missing
    }

    pub fn validate(&self) -> DelveResult<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(invalid(
                format!("Unknown LLM provider: {}", self.llm.provider),
                &format!("Set llm.provider to one of: {}", SUPPORTED_PROVIDERS.join(", ")),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid(
                "LLM temperature must be between 0.0 and 2.0",
                "Set llm.temperature to a value such as 0.1",
            ));
        }

        if self.search.search_depth != "basic" && self.search.search_depth != "advanced" {
            return Err(invalid(
                format!("Unknown search depth: {}", self.search.search_depth),
                "Set search.search_depth to \"basic\" or \"advanced\"",
            ));
        }

        if self.search.max_results == 0 || self.search.timeout_seconds == 0 {
            return Err(invalid(
                "Search max_results and timeout_seconds must be greater than 0",
                "Set search.max_results and search.timeout_seconds to positive values",
            ));
        }

        for level in [&self.logging.level, &self.logging.file_level] {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(invalid(
                    format!("Unknown log level: {}", level),
                    &format!("Use one of: {}", LOG_LEVELS.join(", ")),
                ));
            }
        }

        let ceilings = [
            ("max_searches_total", self.research.max_searches_total),
            ("max_attempts_per_item", self.research.max_attempts_per_item),
            ("min_results_per_item", self.research.min_results_per_item),
            ("max_queries_per_item", self.research.max_queries_per_item),
            ("depth_min_documents", self.research.depth_min_documents),
        ];
        for (name, value) in ceilings {
            if value == 0 {
                return Err(invalid(
                    format!("research.{} must be greater than 0", name),
                    &format!("Set research.{} to a positive value", name),
                ));
            }
        }

        if self.output.reports_dir.trim().is_empty() {
            return Err(invalid(
                "output.reports_dir must not be empty",
                "Set output.reports_dir to a writable directory",
            ));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>, suggestion: &str) -> DelveError {
    DelveError::Config {
        message: message.into(),
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    }
}
