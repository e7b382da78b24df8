//! Response composition
//!
//! Pure functions from a [`ResolvedConfig`] plus a backend outcome to the
//! response types. No clocks, no random ids: composing the same inputs twice
//! yields identical output.
//!
//! Effect and setting lists follow one rule: an entry is present iff its
//! flag is true or its amount is > 0. Clients use membership, not booleans,
//! to learn what ran.

use crate::backend::{Artifact, Content, Features, Measurements, StreamFormat, VocalMetrics};
use crate::error::CompositionError;
use crate::models::{
    Assessment, AudioAnalysisResponse, AudioFeatures, AudioProcessResponse, ComparisonMetrics, Improvement, LyricsResponse,
    MasteringResponse, MixAnalysis, MixMasterResponse, MixMasterSettings, MixingResponse,
    PluginSuggestionRequest, PluginSuggestionResponse, SongwritingResponse, VocalAnalysisResponse,
    VocalCoachResponse,
};
use crate::preferences::ResolvedConfig;

/// What decides whether an effect ran
#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// Boolean key must be true
    Flag(&'static str),
    /// Numeric key must be > 0
    Amount(&'static str),
}

impl Trigger {
    /// `Some(amount)` when applied; flags report 1.0
    fn level(&self, config: &ResolvedConfig) -> Result<Option<f64>, CompositionError> {
        Ok(match *self {
            Trigger::Flag(key) => config.flag(key)?.then_some(1.0),
            Trigger::Amount(key) => {
                let amount = config.number(key)?;
                (amount > 0.0).then_some(amount)
            }
        })
    }
}

struct EffectRule {
    trigger: Trigger,
    describe: fn(f64) -> String,
    suggestion: &'static str,
}

fn describe_eq(_: f64) -> String {
    "EQ: Boosted 3kHz for presence, cut 200Hz for clarity".to_string()
}

fn describe_compression(_: f64) -> String {
    "Compression: Ratio 4:1, threshold -18dB".to_string()
}

fn describe_reverb(amount: f64) -> String {
    format!("Reverb: {}% wet", round1(amount * 100.0))
}

const MIXING_EFFECTS: &[EffectRule] = &[
    EffectRule {
        trigger: Trigger::Flag("apply_eq"),
        describe: describe_eq,
        suggestion: "EQ looks good, vocals are clear and present",
    },
    EffectRule {
        trigger: Trigger::Flag("apply_compression"),
        describe: describe_compression,
        suggestion: "Compression helps control dynamics nicely",
    },
    EffectRule {
        trigger: Trigger::Amount("reverb_amount"),
        describe: describe_reverb,
        suggestion: "Reverb adds nice space without washing out the vocal",
    },
];

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Applied effect descriptions with their matching suggestions
fn applied_effects(
    config: &ResolvedConfig,
    rules: &[EffectRule],
) -> Result<Vec<(String, &'static str)>, CompositionError> {
    let mut applied = Vec::new();
    for rule in rules {
        if let Some(level) = rule.trigger.level(config)? {
            applied.push(((rule.describe)(level), rule.suggestion));
        }
    }
    Ok(applied)
}

/// POST /api/mixing
pub fn compose_mixing(
    config: &ResolvedConfig,
    artifact: &Artifact,
) -> Result<MixingResponse, CompositionError> {
    let effects = applied_effects(config, MIXING_EFFECTS)?;

    let mut suggestions: Vec<String> = effects.iter().map(|(_, s)| s.to_string()).collect();
    let genre = config.text("genre")?;
    if !genre.is_empty() {
        suggestions.push(format!("Genre preset '{}' applied successfully", genre));
    }

    Ok(MixingResponse {
        success: true,
        suggestions,
        applied_effects: effects.into_iter().map(|(e, _)| e).collect(),
        download_url: artifact.download_url.clone(),
    })
}

/// POST /api/mastering
///
/// `final_loudness` is the backend's achieved value when reported, else the
/// resolved target.
pub fn compose_mastering(
    config: &ResolvedConfig,
    artifact: &Artifact,
) -> Result<MasteringResponse, CompositionError> {
    let target = config.number("target_loudness")?;

    Ok(MasteringResponse {
        success: true,
        final_loudness: artifact.achieved_loudness.unwrap_or(target),
        download_url: artifact.download_url.clone(),
    })
}

/// POST /api/mix-master
pub fn compose_mix_master(
    track_count: usize,
    mix: &ResolvedConfig,
    master: &ResolvedConfig,
    measurements: &Measurements,
) -> Result<MixMasterResponse, CompositionError> {
    let applied = |trigger: Trigger, config: &ResolvedConfig| -> Result<bool, CompositionError> {
        Ok(trigger.level(config)?.is_some())
    };

    Ok(MixMasterResponse {
        status: "success".to_string(),
        processed_tracks: track_count,
        settings: MixMasterSettings {
            genre: mix.text("genre")?.to_string(),
            intensity: mix.text("intensity")?.to_string(),
            target_loudness: master.number("targetLoudness")?,
            eq_applied: applied(Trigger::Flag("eq"), mix)?,
            compression_applied: applied(Trigger::Flag("compression"), mix)?,
            limiting_applied: applied(Trigger::Flag("limiting"), master)?,
            spatial_enhancement: applied(Trigger::Flag("spatialEnhancement"), mix)?,
        },
        analysis: MixAnalysis {
            detected_genre: measurements.detected_genre.clone(),
            average_loudness: measurements.average_loudness,
            dynamic_range: measurements.dynamic_range,
            frequency_balance: measurements.frequency_balance.clone(),
        },
    })
}

/// POST /api/songwriting
pub fn compose_songwriting(
    config: &ResolvedConfig,
    content: &Content,
) -> Result<SongwritingResponse, CompositionError> {
    let lyrics = content
        .sections
        .iter()
        .map(|s| (s.name.clone(), s.text.clone()))
        .collect();
    let melody_notes = content
        .melody
        .iter()
        .map(|m| (m.section.clone(), m.notes.clone()))
        .collect();

    Ok(SongwritingResponse {
        lyrics,
        chord_progressions: content.chord_progressions.clone(),
        melody_notes,
        structure: config.text_list("structure")?.to_vec(),
        genre: config.text("genre")?.to_string(),
        mood: config.text("mood")?.to_string(),
    })
}

/// POST /api/lyrics
pub fn compose_lyrics(
    config: &ResolvedConfig,
    content: &Content,
    rhyme_scheme: &str,
) -> Result<LyricsResponse, CompositionError> {
    let lyrics = content
        .sections
        .iter()
        .map(|s| format!("[{}]\n{}", s.name, s.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut suggestions = content.notes.clone();
    suggestions.push(format!("The flow is paced for {} BPM", config.number("bpm")?));
    let artist = config.text("artist")?;
    if !artist.is_empty() {
        suggestions.push(format!("Phrasing leans on the style of {}", artist));
    }

    Ok(LyricsResponse {
        lyrics,
        rhyme_scheme: rhyme_scheme.to_string(),
        suggestions,
    })
}

/// POST /api/analyze-audio
pub fn compose_audio_analysis(features: &Features) -> AudioAnalysisResponse {
    AudioAnalysisResponse {
        duration: features.duration_secs,
        bpm: features.bpm,
        key: features.key.clone(),
        time_signature: features.time_signature.clone(),
        average_loudness: features.average_loudness,
        peak_loudness: features.peak_loudness,
        dynamic_range: features.dynamic_range,
        frequency_spectrum: features.spectrum.clone(),
    }
}

/// POST /api/audio/process
///
/// `stream` and `spectral_centroid` come from the same analysis as
/// `features`; the pipeline rejects analyses that lack them.
pub fn compose_audio_process(
    file_name: Option<&str>,
    features: &Features,
    stream: &StreamFormat,
    spectral_centroid: f64,
) -> AudioProcessResponse {
    AudioProcessResponse {
        filename: file_name.map(str::to_string),
        duration: features.duration_secs,
        sample_rate: stream.sample_rate,
        channels: stream.channels,
        format: stream.codec.clone(),
        features: AudioFeatures {
            tempo: features.bpm,
            key: features.key.clone(),
            loudness: features.average_loudness,
            spectral_centroid,
        },
    }
}

/// Score threshold (0-100) below which an area gets an improvement entry
const IMPROVEMENT_THRESHOLD: f64 = 90.0;
const BREATH_THRESHOLD: f64 = 85.0;

fn assess(score: f64, strong: &str, fair: &str, weak: &str) -> Assessment {
    let feedback = if score >= 90.0 {
        strong
    } else if score >= 75.0 {
        fair
    } else {
        weak
    };
    Assessment {
        score: round1(score / 10.0),
        feedback: feedback.to_string(),
    }
}

fn improvements(metrics: &VocalMetrics) -> Vec<Improvement> {
    let mut list = Vec::new();
    let mut add = |area: &str, suggestion: &str, exercises: &[&str]| {
        list.push(Improvement {
            area: area.to_string(),
            suggestion: suggestion.to_string(),
            exercises: exercises.iter().map(|e| e.to_string()).collect(),
        })
    };

    if metrics.pitch_accuracy < IMPROVEMENT_THRESHOLD {
        add(
            "High Notes",
            "Relax jaw and open throat for clearer high notes",
            &["Lip trills", "Sirens"],
        );
    }
    if metrics.timing < IMPROVEMENT_THRESHOLD {
        add(
            "Timing",
            "Lock in with a metronome on fast passages",
            &["Metronome subdivisions", "Clap-back rhythms"],
        );
    }
    if metrics.tone < IMPROVEMENT_THRESHOLD {
        add(
            "Tone",
            "Keep vowel shapes consistent for an even tone",
            &["Humming", "Vowel modification drills"],
        );
    }
    if metrics.breath_control < BREATH_THRESHOLD {
        add(
            "Breath Support",
            "Practice diaphragmatic breathing",
            &["Hissing exercise", "Sustained 'ah' sounds"],
        );
    }
    list
}

fn overall_percent(metrics: &VocalMetrics) -> f64 {
    (metrics.pitch_accuracy + metrics.timing + metrics.tone) / 3.0
}

/// POST /api/vocal-coach
pub fn compose_vocal_coach(target_style: Option<&str>, metrics: &VocalMetrics) -> VocalCoachResponse {
    VocalCoachResponse {
        overall_score: round1(overall_percent(metrics) / 10.0),
        pitch_accuracy: assess(
            metrics.pitch_accuracy,
            "Excellent pitch control throughout.",
            "Generally good pitch control. Watch for slight sharp tendency on high notes.",
            "Pitch drifts noticeably. Slow down and work with a reference tone.",
        ),
        timing: assess(
            metrics.timing,
            "Rhythmically locked in.",
            "Rhythmic accuracy is good. Consider tightening timing on fast passages.",
            "Timing wanders. Practice against a click track.",
        ),
        tone: assess(
            metrics.tone,
            "Rich, consistent tone.",
            "Nice tone quality. Focus on consistent breath support for sustained notes.",
            "Tone is uneven. Work on resonance and breath support.",
        ),
        improvements: improvements(metrics),
        target_style: target_style.map(str::to_string),
        comparison_metrics: ComparisonMetrics {
            pitch_range: format!("{} octaves", metrics.pitch_range_octaves),
            dynamic_range: metrics.dynamic_range.clone(),
            vibrato: metrics.vibrato.clone(),
        },
    }
}

fn breath_label(score: f64) -> &'static str {
    if score >= 85.0 {
        "Excellent"
    } else if score >= 70.0 {
        "Good"
    } else {
        "Needs work"
    }
}

/// POST /api/vocal-analysis
pub fn compose_vocal_analysis(metrics: &VocalMetrics) -> VocalAnalysisResponse {
    let mut recommendations = Vec::new();
    if metrics.breath_control < BREATH_THRESHOLD {
        recommendations.push("Work on sustaining notes longer".to_string());
        recommendations.push("Practice breath control exercises".to_string());
    }
    if metrics.tone < IMPROVEMENT_THRESHOLD {
        recommendations.push("Consider vocal warm-ups before recording".to_string());
    }
    if metrics.pitch_accuracy < IMPROVEMENT_THRESHOLD {
        recommendations.push("Slight pitch correction needed in chorus".to_string());
    }
    if metrics.timing < IMPROVEMENT_THRESHOLD {
        recommendations.push("Tighten phrase entries against the beat".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Strong take; keep this warm-up routine".to_string());
    }

    VocalAnalysisResponse {
        pitch_accuracy: metrics.pitch_accuracy,
        timing_score: metrics.timing,
        breath_control: breath_label(metrics.breath_control).to_string(),
        recommendations,
        overall_score: round1(overall_percent(metrics)),
    }
}

/// GET /api/vst/suggestions
pub fn compose_plugin_suggestions(
    request: &PluginSuggestionRequest,
    plugins: &[String],
) -> PluginSuggestionResponse {
    PluginSuggestionResponse {
        genre: request.genre.clone(),
        track_type: request.track_type.clone(),
        recommended_plugins: plugins.to_vec(),
    }
}
