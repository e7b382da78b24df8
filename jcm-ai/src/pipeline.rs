//! Per-request orchestration
//!
//! Every endpoint runs the same forward-only sequence:
//!
//! ```text
//! Received -> Validated -> ConfigResolved -> Dispatched -> Composed -> Returned
//!     \___________\______________\______________\____________\-> Failed
//! ```
//!
//! Validation and resolution failures stop before any backend call. The
//! backend call runs under the configured deadline; there are no retries here.

use serde_json::Value;
use std::fmt;
use std::future::Future;
use tracing::{debug, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::backend::{Asset, BackendError, GenerationPrompt};
use crate::composer;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AudioAnalysisResponse, AudioProcessResponse, LyricsResponse, MasteringResponse, MixMasterResponse, MixingResponse,
    PluginSuggestionResponse, SongwritingResponse, UploadedPart, VocalAnalysisResponse,
    VocalCoachResponse,
};
use crate::preferences::OperationKind;
use crate::validators;
use crate::AppState;

/// Request lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Received,
    Validated,
    ConfigResolved,
    Dispatched,
    Composed,
    Returned,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Returned | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Received => "received",
            PipelineState::Validated => "validated",
            PipelineState::ConfigResolved => "config_resolved",
            PipelineState::Dispatched => "dispatched",
            PipelineState::Composed => "composed",
            PipelineState::Returned => "returned",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Stage tracker for one request
#[derive(Debug)]
pub struct RequestTrace {
    id: Uuid,
    endpoint: &'static str,
    state: PipelineState,
    span: Span,
}

impl RequestTrace {
    pub fn new(endpoint: &'static str) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("request", request_id = %id, endpoint);
        span.in_scope(|| debug!(state = %PipelineState::Received, "Pipeline started"));

        Self {
            id,
            endpoint,
            state: PipelineState::Received,
            span,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Move forward to `next`
    ///
    /// Backward moves and moves out of a terminal state are ignored.
    pub fn advance(&mut self, next: PipelineState) {
        if self.state.is_terminal() || next <= self.state {
            self.span.in_scope(|| {
                warn!(from = %self.state, to = %next, "Ignoring out-of-order pipeline transition")
            });
            return;
        }
        self.span
            .in_scope(|| debug!(from = %self.state, to = %next, "Pipeline transition"));
        self.state = next;
    }

    /// Close the trace with the request outcome
    pub fn finish<T>(mut self, outcome: ApiResult<T>) -> ApiResult<T> {
        match &outcome {
            Ok(_) => self.advance(PipelineState::Returned),
            Err(err) => {
                let from = self.state;
                let endpoint = self.endpoint;
                self.span.in_scope(|| {
                    debug!(from = %from, to = %PipelineState::Failed, code = err.code(), endpoint, "Pipeline failed")
                });
                self.state = PipelineState::Failed;
            }
        }
        outcome
    }
}

/// Run a backend call under the configured deadline
async fn dispatch<T, F>(state: &AppState, operation: &'static str, call: F) -> ApiResult<T>
where
    F: Future<Output = Result<T, BackendError>>,
{
    debug!(backend = state.backend.name(), operation, "Dispatching to backend");

    match tokio::time::timeout(state.backend_timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ApiError::from(err)),
        Err(_) => Err(ApiError::BackendTimeout(state.backend_timeout)),
    }
}

/// POST /api/mix-master
///
/// Mix then master under one deadline; analysis comes from whichever stage
/// reported measurements, master first.
pub async fn run_mix_master(state: &AppState, body: &Value) -> ApiResult<MixMasterResponse> {
    let mut trace = RequestTrace::new("mix-master");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_mix_master(body)?;
        trace.advance(PipelineState::Validated);

        let defaults = &state.tables.defaults;
        let mix = defaults
            .resolve(OperationKind::Mix, &request.preferences)
            .map_err(|e| e.nested("preferences"))?;
        let master = defaults
            .resolve(OperationKind::Master, &request.preferences)
            .map_err(|e| e.nested("preferences"))?;
        trace.advance(PipelineState::ConfigResolved);

        let track_count = request.tracks.len();
        let session = Asset::Session {
            tracks: request.tracks,
        };
        let backend = state.backend.as_ref();
        trace.advance(PipelineState::Dispatched);
        let (mixed, mastered) = dispatch(state, "mix+master", async {
            let mixed = backend.mix(&session, &mix).await?;
            let mixdown = Asset::Track {
                track_id: mixed.asset_id.clone(),
            };
            let mastered = backend.master(&mixdown, &master).await?;
            Ok((mixed, mastered))
        })
        .await?;

        let measurements = mastered
            .measurements
            .or(mixed.measurements)
            .ok_or_else(|| BackendError::Incomplete("mix measurements".to_string()))?;

        let response = composer::compose_mix_master(track_count, &mix, &master, &measurements)?;
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// POST /api/songwriting
pub async fn run_songwriting(state: &AppState, body: &Value) -> ApiResult<SongwritingResponse> {
    let mut trace = RequestTrace::new("songwriting");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_songwriting(body)?;
        trace.advance(PipelineState::Validated);

        let config = state
            .tables
            .defaults
            .resolve(OperationKind::Songwriting, &request.preferences())?;
        trace.advance(PipelineState::ConfigResolved);

        let prompt = GenerationPrompt::Song {
            prompt: request.prompt,
        };
        trace.advance(PipelineState::Dispatched);
        let content = dispatch(state, "generate", state.backend.generate(&prompt, &config)).await?;

        let response = composer::compose_songwriting(&config, &content)?;
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// POST /api/lyrics
pub async fn run_lyrics(state: &AppState, body: &Value) -> ApiResult<LyricsResponse> {
    let mut trace = RequestTrace::new("lyrics");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_lyrics(body)?;
        trace.advance(PipelineState::Validated);

        let config = state
            .tables
            .defaults
            .resolve(OperationKind::Lyrics, &request.preferences())?;
        trace.advance(PipelineState::ConfigResolved);

        let prompt = GenerationPrompt::Lyrics {
            style: request.style,
        };
        trace.advance(PipelineState::Dispatched);
        let content = dispatch(state, "generate", state.backend.generate(&prompt, &config)).await?;
        let rhyme_scheme = content
            .rhyme_scheme
            .clone()
            .ok_or_else(|| BackendError::Incomplete("rhyme scheme".to_string()))?;

        let response = composer::compose_lyrics(&config, &content, &rhyme_scheme)?;
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// POST /api/mixing
pub async fn run_mixing(state: &AppState, body: &Value) -> ApiResult<MixingResponse> {
    let mut trace = RequestTrace::new("mixing");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_mixing(body)?;
        trace.advance(PipelineState::Validated);

        let config = state
            .tables
            .defaults
            .resolve(OperationKind::Mixing, &request.preferences())?;
        trace.advance(PipelineState::ConfigResolved);

        let asset = Asset::Track {
            track_id: request.track_id,
        };
        trace.advance(PipelineState::Dispatched);
        let artifact = dispatch(state, "mix", state.backend.mix(&asset, &config)).await?;

        let response = composer::compose_mixing(&config, &artifact)?;
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// POST /api/mastering
pub async fn run_mastering(state: &AppState, body: &Value) -> ApiResult<MasteringResponse> {
    let mut trace = RequestTrace::new("mastering");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_mastering(body)?;
        trace.advance(PipelineState::Validated);

        let config = state
            .tables
            .defaults
            .resolve(OperationKind::Mastering, &request.preferences())?;
        trace.advance(PipelineState::ConfigResolved);

        let asset = Asset::Track {
            track_id: request.track_id,
        };
        trace.advance(PipelineState::Dispatched);
        let artifact = dispatch(state, "master", state.backend.master(&asset, &config)).await?;

        let response = composer::compose_mastering(&config, &artifact)?;
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// POST /api/analyze-audio
pub async fn run_audio_analysis(state: &AppState, body: &Value) -> ApiResult<AudioAnalysisResponse> {
    let mut trace = RequestTrace::new("analyze-audio");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_audio_analysis(body)?;
        trace.advance(PipelineState::Validated);
        // Nothing to resolve; analysis takes no preferences
        trace.advance(PipelineState::ConfigResolved);

        let asset = Asset::Url {
            url: request.audio_url,
        };
        trace.advance(PipelineState::Dispatched);
        let features = dispatch(state, "analyze", state.backend.analyze(&asset)).await?;

        let response = composer::compose_audio_analysis(&features);
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// POST /api/vocal-coach
pub async fn run_vocal_coach(state: &AppState, body: &Value) -> ApiResult<VocalCoachResponse> {
    let mut trace = RequestTrace::new("vocal-coach");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_vocal_coach(body)?;
        trace.advance(PipelineState::Validated);
        trace.advance(PipelineState::ConfigResolved);

        let asset = Asset::Url {
            url: request.audio_url,
        };
        trace.advance(PipelineState::Dispatched);
        let features = dispatch(state, "analyze", state.backend.analyze(&asset)).await?;
        let metrics = features
            .vocal
            .ok_or_else(|| BackendError::Incomplete("vocal metrics".to_string()))?;

        let response = composer::compose_vocal_coach(request.target_style.as_deref(), &metrics);
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// POST /api/vocal-analysis
pub async fn run_vocal_analysis(
    state: &AppState,
    parts: &[UploadedPart],
) -> ApiResult<VocalAnalysisResponse> {
    let mut trace = RequestTrace::new("vocal-analysis");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_vocal_analysis(parts)?;
        trace.advance(PipelineState::Validated);
        trace.advance(PipelineState::ConfigResolved);

        let asset = Asset::Upload {
            file_name: request.file_name,
            content_type: request.content_type,
            size_bytes: request.size_bytes,
        };
        trace.advance(PipelineState::Dispatched);
        let features = dispatch(state, "analyze", state.backend.analyze(&asset)).await?;
        let metrics = features
            .vocal
            .ok_or_else(|| BackendError::Incomplete("vocal metrics".to_string()))?;

        let response = composer::compose_vocal_analysis(&metrics);
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// POST /api/audio/process
pub async fn run_audio_process(
    state: &AppState,
    parts: &[UploadedPart],
) -> ApiResult<AudioProcessResponse> {
    let mut trace = RequestTrace::new("audio-process");
    let span = trace.span.clone();

    let outcome = async {
        let request = validators::validate_audio_process(parts)?;
        trace.advance(PipelineState::Validated);
        trace.advance(PipelineState::ConfigResolved);

        let file_name = request.file_name.clone();
        let asset = Asset::Upload {
            file_name: request.file_name,
            content_type: request.content_type,
            size_bytes: request.size_bytes,
        };
        trace.advance(PipelineState::Dispatched);
        let features = dispatch(state, "analyze", state.backend.analyze(&asset)).await?;
        let stream = features
            .format
            .as_ref()
            .ok_or_else(|| BackendError::Incomplete("stream format".to_string()))?;
        let centroid = features
            .spectral_centroid
            .ok_or_else(|| BackendError::Incomplete("spectral centroid".to_string()))?;

        let response =
            composer::compose_audio_process(file_name.as_deref(), &features, stream, centroid);
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    }
    .instrument(span)
    .await;

    trace.finish(outcome)
}

/// GET /api/vst/suggestions
///
/// Pure table lookup; no backend involved.
pub fn run_plugin_suggestions(
    state: &AppState,
    genre: Option<String>,
    track_type: Option<String>,
) -> ApiResult<PluginSuggestionResponse> {
    let mut trace = RequestTrace::new("vst-suggestions");
    let outcome = trace.span.clone().in_scope(|| {
        let request = validators::validate_plugin_query(genre, track_type)?;
        trace.advance(PipelineState::Validated);

        let plugins = state.tables.plugins.suggest(&request.genre, &request.track_type);
        trace.advance(PipelineState::ConfigResolved);

        let response = composer::compose_plugin_suggestions(&request, plugins);
        trace.advance(PipelineState::Composed);
        Ok::<_, ApiError>(response)
    });
    trace.finish(outcome)
}
