//! JSON request decoding and error responses shared by the HTTP handlers.
//!
//! Every error leaves the server as `{"error": "..."}` with the status code
//! chosen by [`ApiError`]. Engine failures carry DuckDB's message verbatim,
//! which may expose file paths or SQL fragments to the caller.

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use duckgate_engine::EngineError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Standard error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// API error type with HTTP status code mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The body is not valid JSON for the endpoint's request type.
    InvalidJson,
    /// A required field is absent or empty. Holds the field name.
    MissingField(&'static str),
    /// The endpoint does not accept this HTTP method.
    MethodNotAllowed,
    /// No route matches the path.
    NotFound,
    /// DuckDB failed; holds the message to return.
    Execution(String),
}

impl ApiError {
    /// The HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message placed in the `error` field.
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidJson => "invalid json".to_string(),
            ApiError::MissingField(field) => format!("{} is required", field),
            ApiError::MethodNotAllowed => "method not allowed".to_string(),
            ApiError::NotFound => "not found".to_string(),
            ApiError::Execution(msg) => msg.clone(),
        }
    }

    /// An engine failure prefixed with the step that failed
    /// (e.g. `set region: ...`).
    pub fn engine_step(step: &str, err: EngineError) -> Self {
        ApiError::Execution(format!("{}: {}", step, err))
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Execution(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message(),
        });
        (self.status(), body).into_response()
    }
}

/// Decode a JSON request body.
///
/// Decoding is done by hand instead of through axum's `Json` extractor so
/// that every malformed body, whatever the reason, maps to the same 400
/// `invalid json` response.
pub fn decode_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        ApiError::InvalidJson
    })
}

/// Fallback for POST-only routes hit with another method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingField("uri").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Execution("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::MissingField("sql").message(), "sql is required");
        assert_eq!(ApiError::InvalidJson.message(), "invalid json");
        let err = ApiError::engine_step("set region", EngineError::execution("no httpfs"));
        assert_eq!(err.message(), "set region: no httpfs");
    }

    #[test]
    fn test_decode_json() {
        let probe: Probe = decode_json(&Bytes::from_static(br#"{"name":"a"}"#)).unwrap();
        assert_eq!(probe.name, "a");

        let probe: Probe = decode_json(&Bytes::from_static(b"{}")).unwrap();
        assert!(probe.name.is_empty());

        assert_eq!(
            decode_json::<Probe>(&Bytes::from_static(b"{not json")).unwrap_err(),
            ApiError::InvalidJson
        );
        assert_eq!(
            decode_json::<Probe>(&Bytes::new()).unwrap_err(),
            ApiError::InvalidJson
        );
        assert_eq!(
            decode_json::<Probe>(&Bytes::from_static(br#"{"name":5}"#)).unwrap_err(),
            ApiError::InvalidJson
        );
    }
}
