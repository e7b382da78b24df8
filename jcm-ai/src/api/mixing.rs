//! Mixing and mastering endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;

use super::json_body;
use crate::error::ApiResult;
use crate::models::{MasteringResponse, MixMasterResponse, MixingResponse};
use crate::{pipeline, AppState};

/// POST /api/mix-master
///
/// Mix and master a multitrack session in one pass.
pub async fn mix_master(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MixMasterResponse>> {
    let body = json_body(body)?;
    pipeline::run_mix_master(&state, &body).await.map(Json)
}

/// POST /api/mixing
pub async fn mixing(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MixingResponse>> {
    let body = json_body(body)?;
    pipeline::run_mixing(&state, &body).await.map(Json)
}

/// POST /api/mastering
pub async fn mastering(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MasteringResponse>> {
    let body = json_body(body)?;
    pipeline::run_mastering(&state, &body).await.map(Json)
}

/// Build mixing routes
pub fn mixing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mix-master", post(mix_master))
        .route("/api/mixing", post(mixing))
        .route("/api/mastering", post(mastering))
}
