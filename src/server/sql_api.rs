//! SQL REST API over the embedded DuckDB session.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/connect` | Set the S3 region and/or endpoint for the session |
//! | `POST` | `/quick` | Preview a remote file without writing SQL |
//! | `POST` | `/query` | Execute arbitrary SQL |
//!
//! Any other method on these paths returns 405. SQL in `/query` runs
//! verbatim: there is no allowlist and no read-only mode.
//!
//! # Example
//!
//! ```bash
//! curl -X POST http://localhost:8080/connect \
//!   -H 'Content-Type: application/json' \
//!   -d '{"s3_region": "us-east-1"}'
//!
//! curl -X POST http://localhost:8080/quick \
//!   -H 'Content-Type: application/json' \
//!   -d '{"uri": "s3://bucket/events.parquet", "format": "parquet", "limit": 20}'
//!
//! curl -X POST http://localhost:8080/query \
//!   -H 'Content-Type: application/json' \
//!   -d '{"sql": "SELECT 1 AS a, '\''x'\'' AS b"}'
//! ```

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use duckgate_engine::{EngineError, QuickView, Row, SqlEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::response::{decode_json, method_not_allowed, ApiError};

/// Shared state for the SQL API.
#[derive(Clone)]
pub struct SqlApiState {
    /// The process-wide engine session.
    pub engine: Arc<dyn SqlEngine>,
}

impl SqlApiState {
    /// Wrap an engine for use as router state.
    pub fn new(engine: Arc<dyn SqlEngine>) -> Self {
        Self { engine }
    }

    /// Run `f` against the engine on the blocking thread pool.
    async fn with_engine<T, F>(&self, f: F) -> duckgate_engine::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SqlEngine) -> duckgate_engine::Result<T> + Send + 'static,
    {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || f(engine.as_ref()))
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?
    }
}

// ─── Request / Response types ────────────────────────────────────────────────

/// Request body for `POST /connect`. Empty strings count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    /// S3 region, e.g. `us-east-1`.
    #[serde(default)]
    pub s3_region: Option<String>,

    /// S3-compatible endpoint, e.g. `localhost:9000`.
    #[serde(default)]
    pub s3_endpoint: Option<String>,
}

/// Response body for `POST /connect`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectResponse {
    /// Always `true` on success.
    pub ok: bool,
    /// Human-readable status.
    pub message: String,
}

/// Request body for `POST /quick`.
///
/// # Fields
///
/// | Field | Type | Default | Description |
/// |-------|------|---------|-------------|
/// | `uri` | `String` | (required) | File URI, e.g. `s3://bucket/key.parquet` |
/// | `format` | `String` | `parquet` | `parquet`, `json`, `jsonl`, `ndjson` or `csv` |
/// | `limit` | `i64` | `100` | Row limit; values `<= 0` use the default |
#[derive(Debug, Default, Deserialize)]
pub struct QuickRequest {
    /// File URI.
    #[serde(default)]
    pub uri: String,

    /// File format name.
    #[serde(default)]
    pub format: String,

    /// Row limit.
    #[serde(default)]
    pub limit: i64,
}

/// Response body for `POST /quick`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuickResponse {
    /// Result rows.
    pub rows: Vec<Row>,
    /// Column names in result order.
    pub columns: Vec<String>,
    /// The generated SQL, as executed.
    pub sql: String,
}

/// Request body for `POST /query`.
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    /// SQL to execute verbatim.
    #[serde(default)]
    pub sql: String,
}

/// Response body for `POST /query`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Result rows.
    pub rows: Vec<Row>,
    /// Column names in result order.
    pub columns: Vec<String>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Create the SQL API router with all endpoints.
pub fn create_sql_api_router(state: SqlApiState) -> Router {
    Router::new()
        .route(
            "/connect",
            post(connect_handler).fallback(method_not_allowed),
        )
        .route("/quick", post(quick_handler).fallback(method_not_allowed))
        .route("/query", post(query_handler).fallback(method_not_allowed))
        .with_state(state)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// Apply S3 settings to the session.
async fn connect_handler(
    State(state): State<SqlApiState>,
    body: Bytes,
) -> Result<Json<ConnectResponse>, ApiError> {
    let request: ConnectRequest = decode_json(&body)?;
    let region = request.s3_region.filter(|r| !r.is_empty());
    let endpoint = request.s3_endpoint.filter(|e| !e.is_empty());

    if let Some(region) = region {
        info!(region = %region, "Setting S3 region");
        state
            .with_engine(move |engine| engine.set_region(&region))
            .await
            .map_err(|e| ApiError::engine_step("set region", e))?;
    }

    if let Some(endpoint) = endpoint {
        info!(endpoint = %endpoint, "Setting S3 endpoint");
        state
            .with_engine(move |engine| engine.set_endpoint(&endpoint))
            .await
            .map_err(|e| ApiError::engine_step("set endpoint", e))?;
    }

    Ok(Json(ConnectResponse {
        ok: true,
        message: "httpfs configured".to_string(),
    }))
}

/// Preview a file with a generated `SELECT * ... LIMIT n`.
async fn quick_handler(
    State(state): State<SqlApiState>,
    body: Bytes,
) -> Result<Json<QuickResponse>, ApiError> {
    let request: QuickRequest = decode_json(&body)?;
    if request.uri.is_empty() {
        return Err(ApiError::MissingField("uri"));
    }

    let view = QuickView::new(request.uri, &request.format, request.limit);
    let sql = view.to_sql();
    info!(format = %view.format, limit = view.limit, "Quick view");

    let query_sql = sql.clone();
    let result = state
        .with_engine(move |engine| engine.execute(&query_sql))
        .await?;

    Ok(Json(QuickResponse {
        rows: result.rows,
        columns: result.columns,
        sql,
    }))
}

/// Execute caller-supplied SQL.
async fn query_handler(
    State(state): State<SqlApiState>,
    body: Bytes,
) -> Result<Json<QueryResponse>, ApiError> {
    let request: QueryRequest = decode_json(&body)?;
    if request.sql.trim().is_empty() {
        return Err(ApiError::MissingField("sql"));
    }

    let sql = request.sql;
    let result = state.with_engine(move |engine| engine.execute(&sql)).await?;

    Ok(Json(QueryResponse {
        rows: result.rows,
        columns: result.columns,
    }))
}
