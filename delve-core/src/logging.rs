//! Unified logging system
//!
//! Provides structured logging with performance monitoring and configurable output

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Also append log output to a file; the console keeps logging
    pub log_to_file: bool,
    /// Level of the file output
    pub file_level: String,
    /// Log file path; defaults to `logs/delve_YYYYMMDD.log` when logging to file
    pub log_file_path: Option<String>,
    /// Whether to log span close events with their timings
    pub enable_performance_monitoring: bool,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_to_file: false,
            file_level: "debug".to_string(),
            log_file_path: None,
            enable_performance_monitoring: false,
            filter_directives: vec![
                "delve=info".to_string(),
                "delve_core=info".to_string(),
                "delve_llm=info".to_string(),
                "delve_search=info".to_string(),
                "delve_research=info".to_string(),
                "delve_report=info".to_string(),
            ],
        }
    }
}

impl LoggingConfig {
    /// Raise every delve crate to debug, keeping other directives
    pub fn verbose(self) -> Self {
        self.with_level("debug")
    }

    /// Set the level and move every delve directive to it
    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self.filter_directives = self
            .filter_directives
            .iter()
            .map(|d| match d.split_once('=') {
                Some((target, _)) if target.starts_with("delve") => {
                    format!("{}={}", target, level)
                }
                _ => d.clone(),
            })
            .collect();
        self
    }

    fn filter(&self) -> Result<EnvFilter, BoxError> {
        let mut filter = EnvFilter::new(&self.level);
        for directive in &self.filter_directives {
            filter = filter.add_directive(directive.parse()?);
        }
        Ok(filter)
    }

    /// Resolve the file that log output is appended to
    pub fn resolved_log_path(&self) -> PathBuf {
        match &self.log_file_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("logs").join(format!(
                "delve_{}.log",
                chrono::Local::now().format("%Y%m%d")
            )),
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One output of the subscriber, installed on the base registry
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(config: &LoggingConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_span_events(if config.enable_performance_monitoring {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread)
        .with_thread_names(config.include_thread)
        .with_ansi(ansi)
        .with_writer(writer);

    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// Build the console layer and, when enabled, the file layer
///
/// `RUST_LOG` overrides the console filter only. The file filter is
/// `file_level` applied to the same directives.
pub fn logging_layers(config: &LoggingConfig) -> Result<Vec<BoxedLayer>, BoxError> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.filter()?,
    };
    let mut layers = vec![fmt_layer(config, io::stderr, true)
        .with_filter(console_filter)
        .boxed()];

    if config.log_to_file {
        let log_path = config.resolved_log_path();
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        let file_filter = config.clone().with_level(&config.file_level).filter()?;
        layers.push(
            fmt_layer(config, Mutex::new(file), false)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    Ok(layers)
}

/// Initialize the logging system
pub fn init_logging(config: &LoggingConfig) -> Result<(), BoxError> {
    tracing_subscriber::registry()
        .with(logging_layers(config)?)
        .try_init()?;
    Ok(())
}

/// Performance monitoring utilities
pub mod performance {
    use std::time::Instant;
    use tracing::{info_span, Instrument};

    /// Measure and log execution time of an async operation
    pub async fn measure_async<F, T>(operation_name: &str, future: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let span = info_span!("performance", operation = operation_name);
        let start = Instant::now();

        let result = future.instrument(span).await;

        tracing::info!(
            target: "performance",
            operation = operation_name,
            duration_ms = start.elapsed().as_millis() as u64,
            "Operation completed"
        );

        result
    }
}

/// Logging macros for common patterns
#[macro_export]
macro_rules! log_operation_start {
    ($operation:expr) => {
        tracing::info!(
            operation = $operation,
            "Starting operation"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info!(
            operation = $operation,
            $($field)*,
            "Starting operation"
        );
    };
}

#[macro_export]
macro_rules! log_operation_success {
    ($operation:expr) => {
        tracing::info!(
            operation = $operation,
            "Operation completed successfully"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info!(
            operation = $operation,
            $($field)*,
            "Operation completed successfully"
        );
    };
}

#[macro_export]
macro_rules! log_operation_error {
    ($operation:expr, $error:expr) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            "Operation failed"
        );
    };
    ($operation:expr, $error:expr, $($field:tt)*) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            $($field)*,
            "Operation failed"
        );
    };
}
