//! duckgate - SQL over HTTP for an embedded DuckDB

use clap::Parser;
use duckgate::config::merge_config_with_args;
use duckgate::{
    start_http_server, ConfigFile, DuckgateError, Result, ServerArgs, ServerConfig, SqlApiState,
};
use duckgate_engine::{EngineSession, SqlEngine};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    if let Err(e) = run() {
        if e.is_startup_fatal() {
            error!(error = %e, "Engine setup failed");
        }
        eprintln!("duckgate failed to start: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    // Parse command-line arguments (before runtime creation)
    let mut args = ServerArgs::parse();

    if args.generate_config {
        println!("{}", ConfigFile::generate_example());
        return Ok(());
    }

    // Load configuration file if specified or from default locations
    let config_file = match args.config {
        Some(ref path) => Some(ConfigFile::load(path)?),
        None => ConfigFile::load_default(),
    };

    // Merge config file values with CLI args (CLI takes precedence)
    if let Some(ref config) = config_file {
        args = merge_config_with_args(args, config);
    }

    let log_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter)
        .init();

    if config_file.is_some() {
        info!("Configuration loaded from file");
    }

    let config = ServerConfig::from_args(args)?;
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e);
    }

    // One connection for the lifetime of the process: an in-memory DuckDB
    // database exists only inside the connection that created it.
    let settings = config.session_settings();
    let session = EngineSession::open(&settings)?;
    session.configure(&settings)?;
    let engine: Arc<dyn SqlEngine> = Arc::new(session);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| DuckgateError::Server(format!("Failed to create Tokio runtime: {}", e)))?;

    runtime.block_on(start_http_server(config.http_addr, SqlApiState::new(engine)))
}
