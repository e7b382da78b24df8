//! Response types
//!
//! Field names are part of the client contract; camelCase endpoints and
//! snake_case endpoints are kept as clients know them.

use serde::Serialize;
use std::collections::BTreeMap;

pub use crate::backend::{ChordProgression, FrequencySpectrum};

/// GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Build identification reported by GET /
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

/// GET /
#[derive(Debug, Clone, Serialize)]
pub struct ServiceIndex {
    pub service: String,
    pub version: String,
    pub build: BuildInfo,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// Settings applied by mix-master
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixMasterSettings {
    pub genre: String,
    pub intensity: String,
    pub target_loudness: f64,
    pub eq_applied: bool,
    pub compression_applied: bool,
    pub limiting_applied: bool,
    pub spatial_enhancement: bool,
}

/// Measurements of the mix-master result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixAnalysis {
    pub detected_genre: String,
    pub average_loudness: f64,
    pub dynamic_range: f64,
    pub frequency_balance: String,
}

/// POST /api/mix-master
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixMasterResponse {
    pub status: String,
    pub processed_tracks: usize,
    pub settings: MixMasterSettings,
    pub analysis: MixAnalysis,
}

/// POST /api/songwriting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongwritingResponse {
    pub lyrics: BTreeMap<String, String>,
    pub chord_progressions: Vec<ChordProgression>,
    pub melody_notes: BTreeMap<String, Vec<String>>,
    pub structure: Vec<String>,
    pub genre: String,
    pub mood: String,
}

/// Score (0-10) with a short comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub area: String,
    pub suggestion: String,
    pub exercises: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    pub pitch_range: String,
    pub dynamic_range: String,
    pub vibrato: String,
}

/// POST /api/vocal-coach
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocalCoachResponse {
    pub overall_score: f64,
    pub pitch_accuracy: Assessment,
    pub timing: Assessment,
    pub tone: Assessment,
    pub improvements: Vec<Improvement>,
    pub target_style: Option<String>,
    pub comparison_metrics: ComparisonMetrics,
}

/// POST /api/analyze-audio
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAnalysisResponse {
    pub duration: f64,
    pub bpm: f64,
    pub key: String,
    pub time_signature: String,
    pub average_loudness: f64,
    pub peak_loudness: f64,
    pub dynamic_range: f64,
    pub frequency_spectrum: FrequencySpectrum,
}

/// Feature summary of a processed upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioFeatures {
    pub tempo: f64,
    pub key: String,
    pub loudness: f64,
    pub spectral_centroid: f64,
}

/// POST /api/audio/process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioProcessResponse {
    pub filename: Option<String>,
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub format: String,
    pub features: AudioFeatures,
}

/// POST /api/lyrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricsResponse {
    pub lyrics: String,
    pub rhyme_scheme: String,
    pub suggestions: Vec<String>,
}

/// POST /api/vocal-analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocalAnalysisResponse {
    pub pitch_accuracy: f64,
    pub timing_score: f64,
    pub breath_control: String,
    pub recommendations: Vec<String>,
    pub overall_score: f64,
}

/// POST /api/mixing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixingResponse {
    pub success: bool,
    pub suggestions: Vec<String>,
    pub applied_effects: Vec<String>,
    pub download_url: Option<String>,
}

/// POST /api/mastering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasteringResponse {
    pub success: bool,
    pub final_loudness: f64,
    pub download_url: Option<String>,
}

/// GET /api/vst/suggestions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginSuggestionResponse {
    pub genre: String,
    pub track_type: String,
    pub recommended_plugins: Vec<String>,
}
