//! HTTP server for duckgate
//!
//! - [`http`] -- Router assembly, health check, server lifecycle.
//! - [`sql_api`] -- `/connect`, `/quick` and `/query` handlers.
//! - [`middleware`] -- CORS and request logging.
//! - [`response`] -- JSON decoding and error responses.
//! - [`shutdown`] -- Ctrl-C / SIGTERM handling.

pub mod http;
pub mod middleware;
pub mod response;
pub mod shutdown;
pub mod sql_api;

pub use http::{create_router, start_http_server, HealthStatus};
pub use response::{ApiError, ErrorResponse};
pub use sql_api::{create_sql_api_router, SqlApiState};
