//! Delve CLI - Command-line interface for Delve
//!
//! Runs a research query end to end and manages the configuration file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use delve_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, DelveConfig,
    DelveError, DelveResult, ErrorContext, LoggingConfig, ReportFormat,
};
use delve_report::ReportWriter;
use delve_research::{ResearchReport, ResearchService};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "delve")]
#[command(about = "Iterative web research that ends in a cited report")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a question and write a cited report
    Research {
        /// The question to research
        query: String,

        /// LLM provider (gemini, openrouter, openai, anthropic, ollama, groq)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model name; the provider's default when omitted
        #[arg(short, long)]
        model: Option<String>,

        /// Report file format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Directory the report is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Ceiling on web searches for this run
        #[arg(long)]
        max_searches: Option<usize>,

        /// Return a sample report without calling any API
        #[arg(long)]
        test_mode: bool,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,

        /// Print the default configuration file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Html,
    Both,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Both => ReportFormat::Both,
        }
    }
}

struct ResearchArgs {
    query: String,
    provider: Option<String>,
    model: Option<String>,
    format: Option<FormatArg>,
    output_dir: Option<PathBuf>,
    max_searches: Option<usize>,
    test_mode: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: failed to read .env file: {}", e);
        }
    }

    let config = match &cli.command {
        Commands::Research { .. } => load_config(cli.config.as_deref())?,
        // `config --init` may be about to create the file
        Commands::Config { .. } => load_config(cli.config.as_deref()).unwrap_or_default(),
    };

    let logging = logging_config(&config, cli.log_file.as_deref(), cli.verbose);
    init_logging(&logging).map_err(|e| DelveError::Config {
        message: format!("Failed to initialize logging: {}", e),
        source: Some(e),
        context: ErrorContext::new("cli")
            .with_operation("init_logging")
            .with_suggestion("Check logging configuration"),
    })?;

    info!("Starting Delve CLI v{}", env!("CARGO_PKG_VERSION"));
    match resolve_config_path(cli.config.as_deref()) {
        Some(path) => info!("Configuration file: {:?}", path),
        None => info!("No configuration file found, using defaults"),
    }

    match cli.command {
        Commands::Research {
            query,
            provider,
            model,
            format,
            output_dir,
            max_searches,
            test_mode,
        } => {
            let args = ResearchArgs {
                query,
                provider,
                model,
                format,
                output_dir,
                max_searches,
                test_mode,
            };
            handle_research(args, config).await?;
        }
        Commands::Config {
            show,
            init,
            validate,
            path,
        } => {
            handle_config(cli.config.as_deref(), show, init, validate, path)?;
        }
    }

    Ok(())
}

/// Default configuration file path
fn default_config_path() -> DelveResult<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("delve").join("config.toml"))
        .ok_or_else(|| {
            DelveError::config("Could not determine a configuration directory", "cli")
        })
}

/// The explicit path, else the first default location that exists
fn resolve_config_path(config_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let default_paths = [
        dirs::config_dir().map(|d| d.join("delve").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".delve").join("config.toml")),
        Some(PathBuf::from("delve.toml")),
    ];
    default_paths.into_iter().flatten().find(|path| path.exists())
}

fn load_config(config_path: Option<&Path>) -> DelveResult<DelveConfig> {
    match resolve_config_path(config_path) {
        Some(path) => DelveConfig::from_file(path),
        None => Ok(DelveConfig::default()),
    }
}

/// Logging settings from the configuration file with command-line overrides
fn logging_config(config: &DelveConfig, log_file: Option<&Path>, verbose: bool) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if let Some(path) = log_file {
        logging.log_to_file = true;
        logging.log_file_path = Some(path.to_string_lossy().into_owned());
    }
    if verbose {
        logging = logging.verbose();
    }
    logging
}

async fn handle_research(args: ResearchArgs, mut config: DelveConfig) -> anyhow::Result<()> {
    log_operation_start!("cli_research", query = %args.query);

    if let Some(provider) = args.provider {
        if provider != config.llm.provider {
            // A key from the file belongs to the previous provider
            config.llm.api_key = None;
            config.llm.base_url = None;
        }
        config.llm.provider = provider;
    }
    if args.model.is_some() {
        config.llm.model = args.model;
    }
    if let Some(format) = args.format {
        config.output.format = format.into();
    }
    if let Some(dir) = args.output_dir {
        config.output.reports_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(max_searches) = args.max_searches {
        config.research.max_searches_total = max_searches;
    }
    config.apply_env();

    let service = if args.test_mode {
        println!("🧪 Test mode: no API calls will be made");
        ResearchService::test_mode()
    } else {
        ResearchService::from_config(&config).await.map_err(|e| {
            log_operation_error!("cli_research", e);
            e
        })?
    };

    println!("🔎 Researching: {}", args.query);
    let report = service.research(&args.query).await.map_err(|e| {
        log_operation_error!("cli_research", e, phase = ?e.phase());
        e
    })?;

    println!("\n{}\n", report.markdown);
    print_summary(&report);

    let writer = ReportWriter::from_output_config(&config.output);
    let paths = writer
        .persist_report(&report.markdown, config.output.format)
        .await
        .context("Report was generated but could not be saved")?;
    for path in &paths {
        println!("💾 Saved: {}", path.display());
    }

    log_operation_success!("cli_research",
        query = %args.query,
        files = paths.len()
    );
    Ok(())
}

fn print_summary(report: &ResearchReport) {
    if report.test_mode {
        return;
    }
    let stats = &report.stats;
    println!("📊 Research summary");
    println!("  Searches: {}", stats.total_searches);
    println!("  Unique sources: {}", stats.unique_sources);
    println!("  Evaluations: {}", stats.evaluations);
    if let Some(termination) = report.termination {
        println!("  Stopped because: {:?}", termination);
    }
    if stats.coverage_is_stale {
        warn!("Coverage predates the last searches because the search budget ran out");
    }
}

fn handle_config(
    config_path: Option<&Path>,
    show: bool,
    init: bool,
    validate: bool,
    path: bool,
) -> anyhow::Result<()> {
    if path {
        let target = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        println!("{}", target.display());
    }

    if init {
        let target = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        DelveConfig::default().save_to_file(&target)?;
        println!("✅ Configuration initialized at: {:?}", target);
        println!("📝 API keys are read from the environment unless set in the file.");
    }

    if show {
        let mut config = load_config(config_path)?;
        mask_secret(&mut config.llm.api_key);
        mask_secret(&mut config.search.api_key);
        println!("📋 Current configuration:");
        println!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?
        );
    }

    if validate {
        let mut config = load_config(config_path)?;
        config.apply_env();
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
        for name in config.missing_credentials() {
            println!("⚠️  {} is not set", name);
        }
    }

    Ok(())
}

fn mask_secret(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some("********".to_string());
    }
}
