#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # duckgate
//!
//! duckgate exposes an embedded DuckDB engine over HTTP: clients send SQL
//! (or a "quick view" request for a remote file) as JSON and receive rows
//! back as JSON.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with defaults (listens on 0.0.0.0:8080, in-memory database)
//! $ ./duckgate
//!
//! # Preview a Parquet file on S3
//! $ curl -X POST localhost:8080/quick -d '{"uri":"s3://bucket/data.parquet"}'
//!
//! # Run SQL
//! $ curl -X POST localhost:8080/query -d '{"sql":"SELECT 42 AS answer"}'
//! ```
//!
//! ## Architecture
//!
//! - [`config`] -- CLI arguments, TOML file, validation.
//! - [`server`] -- axum router, handlers, middleware.
//! - [`duckgate_engine`] -- The single DuckDB session and result
//!   materialisation (separate workspace crate).
//!
//! There is exactly one DuckDB connection per process. Requests queue on it,
//! so a slow query delays every other request. There is no authentication:
//! anyone who can reach the port can run any SQL.

pub mod config;
pub mod error;
pub mod server;

pub use config::{ConfigFile, ServerArgs, ServerConfig};
pub use error::{DuckgateError, Result};
pub use server::{create_router, start_http_server, SqlApiState};
