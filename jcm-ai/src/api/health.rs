//! Service index and health check

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use std::collections::BTreeMap;

use crate::models::{BuildInfo, HealthResponse, ServiceIndex};
use crate::AppState;

const SERVICE_NAME: &str = "jcm-ai";

/// GET /
///
/// Service identification and endpoint listing.
pub async fn service_index() -> Json<ServiceIndex> {
    let endpoints = BTreeMap::from([
        ("health", "GET /health"),
        ("mix_master", "POST /api/mix-master"),
        ("songwriting", "POST /api/songwriting"),
        ("vocal_coach", "POST /api/vocal-coach"),
        ("analyze_audio", "POST /api/analyze-audio"),
        ("lyrics", "POST /api/lyrics"),
        ("vocal_analysis", "POST /api/vocal-analysis"),
        ("audio_processing", "POST /api/audio/process"),
        ("mixing", "POST /api/mixing"),
        ("mastering", "POST /api/mastering"),
        ("vst_suggestions", "GET /api/vst/suggestions"),
    ]);

    Json(ServiceIndex {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: BuildInfo {
            git_hash: env!("JCM_GIT_HASH").to_string(),
            build_timestamp: env!("JCM_BUILD_TIMESTAMP").to_string(),
            build_profile: env!("JCM_BUILD_PROFILE").to_string(),
        },
        endpoints,
    })
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);

    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
    })
}

/// Build health and index routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(service_index))
        .route("/health", get(health_check))
}
