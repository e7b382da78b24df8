//! Error types for jcm-ai
//!
//! Every failure reaching a client is rendered as
//! `{"error": {"code", "message", "field"?}}` with a stable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

use crate::backend::BackendError;
use crate::preferences::OperationKind;

/// Malformed or out-of-range client input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {constraint}")]
pub struct ValidationError {
    /// Offending field (dotted path for nested objects)
    pub field: String,
    /// Violated constraint, human readable
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    /// Prefix the field with its parent object name
    pub fn nested(self, parent: &str) -> Self {
        Self {
            field: format!("{}.{}", parent, self.field),
            constraint: self.constraint,
        }
    }
}

/// A resolved config lacked a key (or had the wrong type) while composing
///
/// Indicates a defect: resolution guarantees every key is present.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("resolved {kind} config has no {expected} value for '{key}'")]
pub struct CompositionError {
    pub kind: OperationKind,
    pub key: String,
    pub expected: &'static str,
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client input rejected (400)
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Backend unreachable or reported failure (503)
    #[error("Processing backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend did not answer within the deadline (504)
    #[error("Processing backend timed out after {}ms", .0.as_millis())]
    BackendTimeout(Duration),

    /// Invariant violation while composing a response (500)
    #[error("Internal composition error: {0}")]
    InternalComposition(#[from] CompositionError),
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::TimedOut(after) => ApiError::BackendTimeout(after),
            other => ApiError::BackendUnavailable(other.to_string()),
        }
    }
}

impl ApiError {
    /// Stable machine-readable identifier
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            ApiError::BackendTimeout(_) => "BACKEND_TIMEOUT",
            ApiError::InternalComposition(_) => "INTERNAL_COMPOSITION_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BackendTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::InternalComposition(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            ApiError::Validation(err) => {
                warn!(field = %err.field, "Rejected request: {}", err.constraint);
                json!({
                    "error": {
                        "code": code,
                        "message": err.constraint,
                        "field": err.field,
                    }
                })
            }
            ApiError::InternalComposition(err) => {
                // Internal detail stays in the log
                error!("{}", err);
                json!({
                    "error": {
                        "code": code,
                        "message": "Failed to compose response",
                    }
                })
            }
            ApiError::BackendUnavailable(detail) => {
                // Backend addresses and transport detail stay in the log
                error!("Processing backend unavailable: {}", detail);
                json!({
                    "error": {
                        "code": code,
                        "message": "Processing backend unavailable",
                    }
                })
            }
            ApiError::BackendTimeout(after) => {
                error!("{}", self);
                json!({
                    "error": {
                        "code": code,
                        "message": format!("Processing backend timed out after {}ms", after.as_millis()),
                    }
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unavailable_message_hides_backend_detail() {
        let err = ApiError::from(BackendError::Unavailable(
            "analyze: error sending request for url (http://10.0.0.7:9000/analyze)".to_string(),
        ));
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "BACKEND_UNAVAILABLE");
        assert_eq!(body["error"]["message"], "Processing backend unavailable");
    }

    #[tokio::test]
    async fn test_transport_timeout_maps_to_gateway_timeout() {
        let err = ApiError::from(BackendError::TimedOut(Duration::from_millis(1500)));
        assert_eq!(err.code(), "BACKEND_TIMEOUT");

        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["message"], "Processing backend timed out after 1500ms");
    }

    #[test]
    fn test_other_backend_failures_are_unavailable() {
        for err in [
            BackendError::Rejected("mix returned HTTP 500".to_string()),
            BackendError::Incomplete("vocal metrics".to_string()),
        ] {
            assert_eq!(ApiError::from(err).code(), "BACKEND_UNAVAILABLE");
        }
    }
}
