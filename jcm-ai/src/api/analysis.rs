//! Audio and vocal analysis endpoints

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::debug;

use super::json_body;
use crate::error::{ApiResult, ValidationError};
use crate::models::{
    AudioAnalysisResponse, AudioProcessResponse, UploadedPart, VocalAnalysisResponse,
    VocalCoachResponse,
};
use crate::validators::UPLOAD_FIELD;
use crate::{pipeline, AppState};

/// POST /api/vocal-coach
///
/// Scores a recorded vocal performance and suggests exercises.
pub async fn vocal_coach(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<VocalCoachResponse>> {
    let body = json_body(body)?;
    pipeline::run_vocal_coach(&state, &body).await.map(Json)
}

/// POST /api/analyze-audio
pub async fn analyze_audio(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<AudioAnalysisResponse>> {
    let body = json_body(body)?;
    pipeline::run_audio_analysis(&state, &body).await.map(Json)
}

/// Drain every multipart field, keeping only metadata and sizes
async fn collect_parts(mut multipart: Multipart) -> Result<Vec<UploadedPart>, ValidationError> {
    let mut parts = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ValidationError::new(UPLOAD_FIELD, e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ValidationError::new(UPLOAD_FIELD, e.body_text()))?;

        debug!(field = %field_name, bytes = data.len(), "Received multipart field");
        parts.push(UploadedPart {
            field_name,
            file_name,
            content_type,
            size_bytes: data.len(),
        });
    }

    Ok(parts)
}

/// POST /api/vocal-analysis (multipart, field `file`)
pub async fn vocal_analysis(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<VocalAnalysisResponse>> {
    let multipart = multipart.map_err(|e| ValidationError::new(UPLOAD_FIELD, e.body_text()))?;
    let parts = collect_parts(multipart).await?;
    pipeline::run_vocal_analysis(&state, &parts).await.map(Json)
}

/// POST /api/audio/process (multipart, field `file`)
///
/// Stream format and feature summary of an uploaded file.
pub async fn process_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AudioProcessResponse>> {
    let multipart = multipart.map_err(|e| ValidationError::new(UPLOAD_FIELD, e.body_text()))?;
    let parts = collect_parts(multipart).await?;
    pipeline::run_audio_process(&state, &parts).await.map(Json)
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/vocal-coach", post(vocal_coach))
        .route("/api/analyze-audio", post(analyze_audio))
        .route("/api/vocal-analysis", post(vocal_analysis))
        .route("/api/audio/process", post(process_audio))
}
