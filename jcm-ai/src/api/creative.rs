//! Songwriting and lyric generation endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;

use super::json_body;
use crate::error::ApiResult;
use crate::models::{LyricsResponse, SongwritingResponse};
use crate::{pipeline, AppState};

/// POST /api/songwriting
///
/// Song sketch (lyrics per section, chords, melody) from a prompt.
pub async fn songwriting(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SongwritingResponse>> {
    let body = json_body(body)?;
    pipeline::run_songwriting(&state, &body).await.map(Json)
}

/// POST /api/lyrics
pub async fn lyrics(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<LyricsResponse>> {
    let body = json_body(body)?;
    pipeline::run_lyrics(&state, &body).await.map(Json)
}

/// Build creative routes
pub fn creative_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songwriting", post(songwriting))
        .route("/api/lyrics", post(lyrics))
}
