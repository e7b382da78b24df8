//! HTTP API handlers for jcm-ai
//!
//! Handlers take raw JSON bodies and hand them to [`crate::pipeline`], which
//! owns validation and error mapping. A body that is not JSON at all is
//! reported as a validation error on field `body`.

pub mod analysis;
pub mod creative;
pub mod health;
pub mod mixing;
pub mod plugins;

pub use analysis::analysis_routes;
pub use creative::creative_routes;
pub use health::health_routes;
pub use mixing::mixing_routes;
pub use plugins::plugin_routes;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;

use crate::error::{ApiError, ValidationError};

/// Unwrap a JSON body extraction, mapping rejection to a validation error
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ValidationError::new("body", rejection.body_text()).into()),
    }
}
