//! Plugin recommendation endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiResult, ValidationError};
use crate::models::PluginSuggestionResponse;
use crate::{pipeline, AppState};

/// Query parameters for plugin suggestions
///
/// Both are required; they are optional here so a missing one is reported
/// through the regular validation error shape.
#[derive(Debug, Deserialize)]
pub struct PluginQuery {
    pub genre: Option<String>,
    pub track_type: Option<String>,
}

/// GET /api/vst/suggestions?genre=..&track_type=..
///
/// An undecodable query string is a validation error on field `query`.
pub async fn vst_suggestions(
    State(state): State<AppState>,
    query: Result<Query<PluginQuery>, QueryRejection>,
) -> ApiResult<Json<PluginSuggestionResponse>> {
    let Query(query) = query.map_err(|e| ValidationError::new("query", e.body_text()))?;
    pipeline::run_plugin_suggestions(&state, query.genre, query.track_type).map(Json)
}

/// Build plugin routes
pub fn plugin_routes() -> Router<AppState> {
    Router::new().route("/api/vst/suggestions", get(vst_suggestions))
}
