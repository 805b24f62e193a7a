//! Configuration module for duckgate
//!
//! This module is organized into submodules:
//! - `defaults` - Default constants and values
//! - `args` - CLI argument definitions
//! - `file` - TOML configuration file
//! - `merge` - File/CLI precedence rules

mod args;
mod defaults;
pub mod file;
mod merge;

pub use args::ServerArgs;
pub use defaults::*;
pub use file::ConfigFile;
pub use merge::merge_config_with_args;

use duckgate_engine::SessionSettings;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{DuckgateError, Result};
use defaults::DEFAULT_HTTP_SOCKET_ADDR;

/// Complete server configuration for duckgate.
///
/// Built from [`ServerArgs`] after the configuration file has been merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// HTTP API listen address
    pub http_addr: SocketAddr,

    /// Log level filter used when `RUST_LOG` is not set
    pub log_level: String,

    /// DuckDB database file (in-memory when `None`)
    pub database: Option<PathBuf>,

    /// S3 region applied at startup
    pub s3_region: Option<String>,

    /// S3 endpoint applied at startup
    pub s3_endpoint: Option<String>,

    /// Only LOAD httpfs at startup
    pub skip_extension_install: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_SOCKET_ADDR,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            database: None,
            s3_region: None,
            s3_endpoint: None,
            skip_extension_install: false,
        }
    }
}

impl ServerConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_args(args: ServerArgs) -> Result<Self> {
        let http_addr: SocketAddr = args
            .http_addr
            .parse()
            .map_err(|e| DuckgateError::Config(format!("Invalid HTTP address: {}", e)))?;

        Ok(Self {
            http_addr,
            log_level: args.log_level,
            database: args.database,
            s3_region: args.s3_region,
            s3_endpoint: args.s3_endpoint,
            skip_extension_install: args.skip_extension_install,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.http_addr.port() == 0 {
            return Err(DuckgateError::Config(
                "HTTP listen port must be between 1 and 65535".to_string(),
            ));
        }

        if matches!(self.s3_region.as_deref(), Some(r) if r.trim().is_empty()) {
            return Err(DuckgateError::Config(
                "S3 region must not be empty when set".to_string(),
            ));
        }

        if matches!(self.s3_endpoint.as_deref(), Some(e) if e.trim().is_empty()) {
            return Err(DuckgateError::Config(
                "S3 endpoint must not be empty when set".to_string(),
            ));
        }

        if let Some(parent) = self.database.as_ref().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(DuckgateError::Config(format!(
                    "Database directory does not exist: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Engine startup settings derived from this configuration
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            database: self.database.clone(),
            skip_extension_install: self.skip_extension_install,
            s3_region: self.s3_region.clone(),
            s3_endpoint: self.s3_endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_args_defaults() {
        let args = ServerArgs::parse_from(["duckgate", "--http-addr", "0.0.0.0:8080"]);
        let config = ServerConfig::from_args(args).unwrap();
        assert_eq!(config.http_addr, DEFAULT_HTTP_SOCKET_ADDR);
        assert!(config.database.is_none());
    }

    #[test]
    fn test_invalid_http_addr() {
        let args = ServerArgs::parse_from(["duckgate", "--http-addr", "not-an-addr"]);
        let err = ServerConfig::from_args(args).unwrap_err();
        assert!(matches!(err, DuckgateError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let config = ServerConfig {
            http_addr: "127.0.0.1:0".parse().unwrap(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_region() {
        let config = ServerConfig {
            s3_region: Some("  ".to_string()),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_database_dir() {
        let config = ServerConfig {
            database: Some(PathBuf::from("/definitely/not/here/gate.duckdb")),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            database: Some(dir.path().join("gate.duckdb")),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_settings_mirror_config() {
        let config = ServerConfig {
            s3_region: Some("ap-south-1".to_string()),
            skip_extension_install: true,
            ..ServerConfig::default()
        };
        let settings = config.session_settings();
        assert_eq!(settings.s3_region.as_deref(), Some("ap-south-1"));
        assert!(settings.skip_extension_install);
        assert!(settings.database.is_none());
    }
}
