//! Default constants for duckgate configuration
//!
//! These constants define the default values used throughout the configuration
//! system when no explicit value is provided.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default listen address for the HTTP API
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default HTTP socket address (const, no parsing needed)
pub(crate) const DEFAULT_HTTP_SOCKET_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080);

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default configuration file name searched in the standard locations
pub const DEFAULT_CONFIG_FILE_NAME: &str = "duckgate.toml";
