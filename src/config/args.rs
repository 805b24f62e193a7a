//! Command-line arguments for the duckgate server
//!
//! This module defines the CLI arguments structure using clap.

use clap::Parser;
use std::path::PathBuf;

use super::defaults::*;

/// Command-line arguments for the duckgate server
#[derive(Parser, Debug, Clone)]
#[command(name = "duckgate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP facade over an embedded DuckDB engine: SQL in, JSON rows out")]
pub struct ServerArgs {
    /// Path to configuration file (TOML format)
    /// If not specified, looks for duckgate.toml in current directory,
    /// /etc/duckgate/, or ~/.config/duckgate/
    #[arg(short, long, env = "DUCKGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Generate example configuration file and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Address to listen on for the HTTP API
    #[arg(long, env = "DUCKGATE_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    pub http_addr: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DUCKGATE_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// DuckDB database file. When omitted the database lives in memory and
    /// disappears on exit.
    #[arg(long, env = "DUCKGATE_DATABASE")]
    pub database: Option<PathBuf>,

    /// S3 region applied at startup (e.g., "us-east-1")
    #[arg(long, env = "AWS_REGION")]
    pub s3_region: Option<String>,

    /// S3-compatible endpoint applied at startup (for MinIO, LocalStack, etc.)
    #[arg(long, env = "DUCKGATE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Only LOAD the httpfs extension instead of INSTALL + LOAD.
    /// Use on hosts where the extension is pre-installed and there is no
    /// network access to the extension repository.
    #[arg(long, env = "DUCKGATE_SKIP_EXTENSION_INSTALL")]
    pub skip_extension_install: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::parse_from(["duckgate"]);
        assert_eq!(args.http_addr, DEFAULT_HTTP_ADDR);
        assert_eq!(args.log_level, DEFAULT_LOG_LEVEL);
        assert!(args.database.is_none());
        assert!(!args.skip_extension_install);
        assert!(!args.generate_config);
    }

    #[test]
    fn test_explicit_flags() {
        let args = ServerArgs::parse_from([
            "duckgate",
            "--http-addr",
            "127.0.0.1:9000",
            "--database",
            "/tmp/gate.duckdb",
            "--s3-endpoint",
            "localhost:9000",
            "--skip-extension-install",
        ]);
        assert_eq!(args.http_addr, "127.0.0.1:9000");
        assert_eq!(args.database, Some(PathBuf::from("/tmp/gate.duckdb")));
        assert_eq!(args.s3_endpoint.as_deref(), Some("localhost:9000"));
        assert!(args.skip_extension_install);
    }
}
