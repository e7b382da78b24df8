//! Processing backend interface
//!
//! The audio analysis, generation, mixing and mastering engines live outside
//! this service. Handlers only see the [`ProcessingBackend`] trait:
//! - [`LocalStubBackend`]: deterministic in-process placeholder output
//! - [`RemoteBackend`]: HTTP/JSON processing service
//!
//! Retry policy, if any, belongs to the implementation, never to callers.

mod local;
mod remote;

pub use local::LocalStubBackend;
pub use remote::RemoteBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::preferences::ResolvedConfig;

/// Backend call failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Backend could not be reached
    #[error("backend unreachable: {0}")]
    Unavailable(String),

    /// Backend answered with a failure
    #[error("backend rejected request: {0}")]
    Rejected(String),

    /// Backend answered without data the operation requires
    #[error("backend response missing {0}")]
    Incomplete(String),

    /// Transport-level deadline expired before the backend answered
    #[error("backend did not answer within {}ms", .0.as_millis())]
    TimedOut(Duration),
}

/// Asset handed to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Asset {
    /// Remote audio reference
    Url { url: String },
    /// Previously uploaded track
    Track { track_id: String },
    /// Multitrack session for mix-master
    Session { tracks: Vec<Value> },
    /// Audio received with the request
    Upload {
        file_name: Option<String>,
        content_type: Option<String>,
        size_bytes: usize,
    },
}

/// What a generation request asks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum GenerationPrompt {
    /// Full song sketch (lyrics, chords, melody)
    Song { prompt: String },
    /// Lyrics only, in a given style
    Lyrics { style: String },
}

/// Coarse spectral balance description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencySpectrum {
    pub bass: String,
    pub mids: String,
    pub highs: String,
}

/// Container-level properties of decoded audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
    /// Container/codec name, e.g. "wav"
    pub codec: String,
}

/// Singing performance metrics, each score in 0-100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalMetrics {
    pub pitch_accuracy: f64,
    pub timing: f64,
    pub tone: f64,
    pub breath_control: f64,
    pub pitch_range_octaves: f64,
    pub dynamic_range: String,
    pub vibrato: String,
}

/// Result of `analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub duration_secs: f64,
    pub bpm: f64,
    pub key: String,
    pub time_signature: String,
    pub average_loudness: f64,
    pub peak_loudness: f64,
    pub dynamic_range: f64,
    pub spectrum: FrequencySpectrum,
    /// Spectral centroid in Hz, when measured
    #[serde(default)]
    pub spectral_centroid: Option<f64>,
    /// Present when the backend decoded the audio itself
    #[serde(default)]
    pub format: Option<StreamFormat>,
    /// Present when the asset contains a vocal performance
    #[serde(default)]
    pub vocal: Option<VocalMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricSection {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordProgression {
    pub section: String,
    pub chords: Vec<String>,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodyLine {
    pub section: String,
    pub notes: Vec<String>,
}

/// Result of `generate`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    pub sections: Vec<LyricSection>,
    #[serde(default)]
    pub chord_progressions: Vec<ChordProgression>,
    #[serde(default)]
    pub melody: Vec<MelodyLine>,
    #[serde(default)]
    pub rhyme_scheme: Option<String>,
    /// Generator remarks passed on to the client
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Loudness and balance measured on a processed artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub detected_genre: String,
    pub average_loudness: f64,
    pub dynamic_range: f64,
    pub frequency_balance: String,
}

/// Result of `mix` / `master`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub asset_id: String,
    #[serde(default)]
    pub download_url: Option<String>,
    /// Integrated loudness actually reached, when measured
    #[serde(default)]
    pub achieved_loudness: Option<f64>,
    #[serde(default)]
    pub measurements: Option<Measurements>,
}

/// External processing/generation capability
#[async_trait]
pub trait ProcessingBackend: Send + Sync {
    /// Implementation name for logs
    fn name(&self) -> &'static str;

    async fn analyze(&self, asset: &Asset) -> Result<Features, BackendError>;

    async fn generate(
        &self,
        prompt: &GenerationPrompt,
        constraints: &ResolvedConfig,
    ) -> Result<Content, BackendError>;

    async fn mix(&self, asset: &Asset, config: &ResolvedConfig) -> Result<Artifact, BackendError>;

    async fn master(&self, asset: &Asset, config: &ResolvedConfig)
        -> Result<Artifact, BackendError>;
}
