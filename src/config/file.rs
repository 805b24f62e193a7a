//! Configuration file support for duckgate
//!
//! This module provides TOML configuration file parsing and merging with CLI arguments.
//!
//! ## Priority Order
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values
//!
//! ## Example Configuration
//!
//! ```toml
//! # duckgate.toml
//!
//! [server]
//! http_addr = "0.0.0.0:8080"
//! log_level = "info"
//!
//! [engine]
//! # database = "/var/lib/duckgate/gate.duckdb"
//! s3_region = "us-east-1"
//! # s3_endpoint = "localhost:9000"
//! skip_extension_install = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults::DEFAULT_CONFIG_FILE_NAME;
use crate::error::{DuckgateError, Result};

/// Root configuration structure for TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Server configuration
    pub server: ServerSection,

    /// Embedded engine configuration
    pub engine: EngineSection,
}

/// Server section configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// HTTP API listen address
    pub http_addr: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

/// Engine section configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// DuckDB database file (in-memory when absent)
    pub database: Option<PathBuf>,

    /// S3 region applied at startup
    pub s3_region: Option<String>,

    /// S3-compatible endpoint applied at startup
    pub s3_endpoint: Option<String>,

    /// Only LOAD httpfs, never INSTALL it
    pub skip_extension_install: Option<bool>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DuckgateError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            DuckgateError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Try to load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./duckgate.toml
    /// 2. /etc/duckgate/duckgate.toml
    /// 3. ~/.config/duckgate/duckgate.toml
    pub fn load_default() -> Option<Self> {
        let default_paths = [
            PathBuf::from(DEFAULT_CONFIG_FILE_NAME),
            PathBuf::from("/etc/duckgate").join(DEFAULT_CONFIG_FILE_NAME),
            dirs::config_dir()
                .map(|p| p.join("duckgate").join(DEFAULT_CONFIG_FILE_NAME))
                .unwrap_or_default(),
        ];

        for path in default_paths.iter().filter(|p| !p.as_os_str().is_empty()) {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {:?}", path);
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        None
    }

    /// Generate an example configuration file
    pub fn generate_example() -> String {
        r#"# duckgate Configuration File
# Copy to duckgate.toml and customize as needed
#
# Configuration priority (highest to lowest):
# 1. Command-line arguments
# 2. Environment variables
# 3. This configuration file
# 4. Default values

[server]
# HTTP API listen address
http_addr = "0.0.0.0:8080"

# Log level (trace, debug, info, warn, error)
log_level = "info"

[engine]
# DuckDB database file. Leave unset for an in-memory database.
# database = "/var/lib/duckgate/gate.duckdb"

# S3 region applied at startup (AWS_REGION also works)
# s3_region = "us-east-1"

# S3-compatible endpoint applied at startup
# s3_endpoint = "localhost:9000"

# Only LOAD the httpfs extension (it must already be installed)
skip_extension_install = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_empty_config() {
        let config: ConfigFile = toml::from_str("").unwrap();
        assert!(config.server.http_addr.is_none());
        assert!(config.engine.database.is_none());
    }

    #[test]
    fn test_parse_server_section() {
        let toml = r#"
            [server]
            http_addr = "127.0.0.1:9000"
            log_level = "debug"
        "#;
        let config: ConfigFile = toml::from_str(toml).unwrap();
        assert_eq!(config.server.http_addr, Some("127.0.0.1:9000".to_string()));
        assert_eq!(config.server.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_parse_engine_section() {
        let toml = r#"
            [engine]
            database = "/data/gate.duckdb"
            s3_region = "eu-central-1"
            s3_endpoint = "minio:9000"
            skip_extension_install = true
        "#;
        let config: ConfigFile = toml::from_str(toml).unwrap();
        assert_eq!(
            config.engine.database,
            Some(PathBuf::from("/data/gate.duckdb"))
        );
        assert_eq!(config.engine.s3_region.as_deref(), Some("eu-central-1"));
        assert_eq!(config.engine.s3_endpoint.as_deref(), Some("minio:9000"));
        assert_eq!(config.engine.skip_extension_install, Some(true));
    }

    #[test]
    fn test_generated_example_parses() {
        let config: ConfigFile = toml::from_str(&ConfigFile::generate_example()).unwrap();
        assert_eq!(config.server.http_addr.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(config.engine.skip_extension_install, Some(false));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlog_level = \"warn\"").unwrap();
        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.server.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nhttp_addr = ").unwrap();
        let err = ConfigFile::load(file.path()).unwrap_err();
        assert!(matches!(err, DuckgateError::Config(_)));
    }
}
