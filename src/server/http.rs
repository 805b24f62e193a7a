//! HTTP server for the duckgate API
//!
//! This module assembles the full router:
//! - Health check (/health)
//! - SQL API (/connect, /quick, /query)
//! - JSON 404 for everything else
//!
//! and wraps it in request logging and CORS middleware.

use crate::error::{DuckgateError, Result};
use crate::server::middleware::{cors_middleware, log_requests};
use crate::server::response::not_found;
use crate::server::shutdown::shutdown_signal;
use crate::server::sql_api::{create_sql_api_router, SqlApiState};
use axum::{middleware, routing::any, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tracing::info;

/// Health check status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always "ok" while the process is serving
    pub status: String,
    /// Current server time (UTC)
    pub time: DateTime<Utc>,
}

/// Build the complete application router.
pub fn create_router(state: SqlApiState) -> Router {
    Router::new()
        .route("/health", any(health_handler))
        .merge(create_sql_api_router(state))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_requests))
                .layer(middleware::from_fn(cors_middleware)),
        )
}

/// Start the HTTP server and serve until a shutdown signal arrives.
pub async fn start_http_server(addr: SocketAddr, state: SqlApiState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            DuckgateError::Server(format!(
                "HTTP port {} is already in use. \
                 Fix: Use --http-addr 0.0.0.0:{} to pick a different port, \
                 or stop the existing process.",
                addr.port(),
                addr.port().wrapping_add(1)
            ))
        } else {
            DuckgateError::Server(format!("Failed to bind HTTP server to {}: {}", addr, e))
        }
    })?;

    info!(addr = %addr, "Backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Liveness probe: independent of engine state.
async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        time: Utc::now(),
    })
}
