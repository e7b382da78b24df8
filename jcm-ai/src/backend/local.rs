//! In-process placeholder backend
//!
//! Returns fixed, deterministic output shaped by the request so the service
//! is usable without a processing engine attached.

use async_trait::async_trait;
use tracing::debug;

use super::{
    Artifact, Asset, BackendError, ChordProgression, Content, Features, FrequencySpectrum,
    GenerationPrompt, LyricSection, Measurements, MelodyLine, ProcessingBackend, StreamFormat,
    VocalMetrics,
};
use crate::preferences::{OperationKind, ResolvedConfig};

/// Deterministic stub backend
#[derive(Debug, Clone, Default)]
pub struct LocalStubBackend;

impl LocalStubBackend {
    pub fn new() -> Self {
        Self
    }
}

fn asset_id(asset: &Asset) -> String {
    match asset {
        Asset::Url { url } => url.rsplit('/').next().unwrap_or(url).to_string(),
        Asset::Track { track_id } => track_id.clone(),
        Asset::Session { tracks } => format!("session_{}tracks", tracks.len()),
        Asset::Upload { file_name, .. } => file_name.clone().unwrap_or_else(|| "upload".to_string()),
    }
}

/// Codec guessed from the file extension of an upload, "wav" otherwise
fn codec_name(asset: &Asset) -> String {
    match asset {
        Asset::Upload {
            file_name: Some(name),
            ..
        } => match name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
            _ => "wav".to_string(),
        },
        _ => "wav".to_string(),
    }
}

fn song_content(prompt: &str, config: &ResolvedConfig) -> Result<Content, BackendError> {
    let genre = config.text("genre").map_err(|e| BackendError::Rejected(e.to_string()))?;
    let mood = config.text("mood").map_err(|e| BackendError::Rejected(e.to_string()))?;

    let section = |name: &str, line: &str| LyricSection {
        name: name.to_string(),
        text: format!("{} {} {} about {}...", mood, genre, line, prompt),
    };

    Ok(Content {
        sections: vec![
            section("verse1", "verse"),
            section("chorus", "chorus"),
            section("verse2", "second verse"),
            section("bridge", "bridge"),
        ],
        chord_progressions: vec![
            ChordProgression {
                section: "verse".to_string(),
                chords: ["C", "Am", "F", "G"].iter().map(|c| c.to_string()).collect(),
                pattern: "4/4".to_string(),
            },
            ChordProgression {
                section: "chorus".to_string(),
                chords: ["F", "C", "G", "Am"].iter().map(|c| c.to_string()).collect(),
                pattern: "4/4".to_string(),
            },
        ],
        melody: vec![
            MelodyLine {
                section: "verse".to_string(),
                notes: ["C4", "D4", "E4", "G4"].iter().map(|n| n.to_string()).collect(),
            },
            MelodyLine {
                section: "chorus".to_string(),
                notes: ["E4", "G4", "A4", "C5"].iter().map(|n| n.to_string()).collect(),
            },
        ],
        rhyme_scheme: None,
        notes: Vec::new(),
    })
}

fn lyrics_content(style: &str, config: &ResolvedConfig) -> Result<Content, BackendError> {
    let theme = config.text("theme").map_err(|e| BackendError::Rejected(e.to_string()))?;

    Ok(Content {
        sections: vec![
            LyricSection {
                name: "Verse 1".to_string(),
                text: format!(
                    "Living life in the {} lane\n\
                     Every moment feeling like champagne\n\
                     Rising up, never feeling the pain\n\
                     Writing about {} again and again",
                    style, theme
                ),
            },
            LyricSection {
                name: "Chorus".to_string(),
                text: "This is my time, my moment to shine\n\
                       Everything falling perfectly in line\n\
                       Music flowing like the finest wine\n\
                       Every word and every beat is mine"
                    .to_string(),
            },
            LyricSection {
                name: "Verse 2".to_string(),
                text: "Studio sessions going late at night\n\
                       Producer keeping everything tight\n\
                       Mixing, mastering, getting it right\n\
                       Every track becoming dynamite"
                    .to_string(),
            },
        ],
        rhyme_scheme: Some("AABB".to_string()),
        notes: vec![
            "Consider adding a bridge section".to_string(),
            "Try emphasizing the hook more".to_string(),
        ],
        ..Default::default()
    })
}

#[async_trait]
impl ProcessingBackend for LocalStubBackend {
    fn name(&self) -> &'static str {
        "local-stub"
    }

    async fn analyze(&self, asset: &Asset) -> Result<Features, BackendError> {
        debug!(asset = %asset_id(asset), "Stub analysis");

        Ok(Features {
            duration_secs: 180.5,
            bpm: 120.0,
            key: "C major".to_string(),
            time_signature: "4/4".to_string(),
            average_loudness: -14.2,
            peak_loudness: -3.5,
            dynamic_range: 9.0,
            spectrum: FrequencySpectrum {
                bass: "balanced".to_string(),
                mids: "present".to_string(),
                highs: "bright".to_string(),
            },
            spectral_centroid: Some(2500.0),
            format: Some(StreamFormat {
                sample_rate: 44100,
                channels: 2,
                codec: codec_name(asset),
            }),
            vocal: Some(VocalMetrics {
                pitch_accuracy: 87.5,
                timing: 92.0,
                tone: 90.0,
                breath_control: 78.0,
                pitch_range_octaves: 2.5,
                dynamic_range: "Good".to_string(),
                vibrato: "Natural".to_string(),
            }),
        })
    }

    async fn generate(
        &self,
        prompt: &GenerationPrompt,
        constraints: &ResolvedConfig,
    ) -> Result<Content, BackendError> {
        match prompt {
            GenerationPrompt::Song { prompt } => song_content(prompt, constraints),
            GenerationPrompt::Lyrics { style } => lyrics_content(style, constraints),
        }
    }

    async fn mix(&self, asset: &Asset, config: &ResolvedConfig) -> Result<Artifact, BackendError> {
        let id = asset_id(asset);
        debug!(asset = %id, kind = %config.kind(), "Stub mix");

        let detected_genre = match config.kind() {
            OperationKind::Mix => match config.text("genre") {
                Ok("auto") | Err(_) => "auto-detected".to_string(),
                Ok(genre) => genre.to_string(),
            },
            _ => "auto-detected".to_string(),
        };

        Ok(Artifact {
            download_url: Some(format!("/download/mixed_{}.wav", id)),
            asset_id: id,
            achieved_loudness: None,
            measurements: Some(Measurements {
                detected_genre,
                average_loudness: -12.5,
                dynamic_range: 8.2,
                frequency_balance: "optimal".to_string(),
            }),
        })
    }

    async fn master(&self, asset: &Asset, config: &ResolvedConfig) -> Result<Artifact, BackendError> {
        let id = asset_id(asset);
        debug!(asset = %id, kind = %config.kind(), "Stub master");

        Ok(Artifact {
            download_url: Some(format!("/download/mastered_{}.wav", id)),
            asset_id: id,
            achieved_loudness: None,
            measurements: None,
        })
    }
}
