//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type DelveResult<T> = Result<T, DelveError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Delve system
#[derive(Error, Debug)]
pub enum DelveError {
    /// The text-generation provider failed or returned nothing usable
    #[error("Generation error: {message}")]
    Generation {
        message: String,
        provider: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// The web-search provider failed
    #[error("Search error: {message}")]
    Search {
        message: String,
        query: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// Missing credential, unknown provider or invalid setting
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// Rendering or persisting a finished report failed
    #[error("Report error: {message}")]
    Report {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl DelveError {
    /// Create a generation error without an underlying source
    pub fn generation<S: Into<String>>(message: S, component: &str) -> Self {
        DelveError::Generation {
            message: message.into(),
            provider: None,
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Create a search error without an underlying source
    pub fn search<S: Into<String>>(message: S, component: &str) -> Self {
        DelveError::Search {
            message: message.into(),
            query: None,
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Create a configuration error without an underlying source
    pub fn config<S: Into<String>>(message: S, component: &str) -> Self {
        DelveError::Config {
            message: message.into(),
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            DelveError::Generation { context, .. } => Some(context),
            DelveError::Search { context, .. } => Some(context),
            DelveError::Config { context, .. } => Some(context),
            DelveError::Report { context, .. } => Some(context),
            DelveError::Validation { context, .. } => Some(context),
            DelveError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether this error aborts a running research query.
    ///
    /// Capability failures are never retried; every other kind of failure
    /// happens before or after the loop.
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            DelveError::Generation { .. } | DelveError::Search { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            DelveError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            DelveError::Config { .. } | DelveError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            DelveError::Generation { .. } | DelveError::Search { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "External capability failed, query aborted"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::DelveError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'delve config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! missing_credential_error {
    ($var:expr, $component:expr) => {
        $crate::DelveError::Config {
            message: format!("{} is not set", $var),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_operation("resolve_credential")
                .with_suggestion(&format!("Export {} or set it in the config file", $var)),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::DelveError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}
