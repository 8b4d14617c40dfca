//! Delve Web Server
//!
//! HTTP interface for running research queries.

use clap::Parser;
use delve_web::server::DelveServerBuilder;
use delve_web::{init_logging, logging_config, WebConfig};
use std::path::PathBuf;

/// Delve Web Server - research queries over HTTP
#[derive(Parser)]
#[command(name = "delve-web")]
#[command(about = "A web interface for Delve")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Delve configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides the configuration file
    #[arg(long)]
    log_level: Option<String>,

    /// Also append logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let mut config = WebConfig::from_env();
    config.host = args.host;
    config.port = args.port;
    config.dev_mode = args.dev;
    if args.config.is_some() {
        config.config_path = args.config;
    }

    let mut logging = match logging_config(&config, args.log_level.as_deref()) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(path) = &args.log_file {
        logging.log_to_file = true;
        logging.log_file_path = Some(path.to_string_lossy().into_owned());
    }
    if let Err(e) = init_logging(&logging) {
        eprintln!("❌ Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    println!("🚀 Starting Delve Web Server");
    println!("📍 Server: http://{}:{}", config.host, config.port);
    println!("🔧 Development mode: {}", config.dev_mode);

    let server = match DelveServerBuilder::from_config(config).build().await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}
