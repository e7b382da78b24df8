//! Validated request types
//!
//! Instances only come out of [`crate::validators`]; a value of any of these
//! types has passed every field check for its endpoint.

use serde_json::{json, Value};

use crate::preferences::PreferenceSet;

/// POST /api/mix-master
#[derive(Debug, Clone, PartialEq)]
pub struct MixMasterRequest {
    /// Track descriptors as sent by the client (objects)
    pub tracks: Vec<Value>,
    pub preferences: PreferenceSet,
}

/// POST /api/songwriting
#[derive(Debug, Clone, PartialEq)]
pub struct SongwritingRequest {
    pub prompt: String,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub structure: Option<Vec<String>>,
}

/// POST /api/vocal-coach
#[derive(Debug, Clone, PartialEq)]
pub struct VocalCoachRequest {
    pub audio_url: String,
    pub target_style: Option<String>,
}

/// POST /api/analyze-audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAnalysisRequest {
    pub audio_url: String,
}

/// POST /api/lyrics
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsRequest {
    pub style: String,
    pub theme: Option<String>,
    pub mood: Option<String>,
    pub artist: Option<String>,
    pub bpm: Option<u32>,
}

/// POST /api/mixing
#[derive(Debug, Clone, PartialEq)]
pub struct MixingRequest {
    pub track_id: String,
    pub genre: Option<String>,
    pub apply_eq: Option<bool>,
    pub apply_compression: Option<bool>,
    pub reverb_amount: Option<f64>,
}

/// POST /api/mastering
#[derive(Debug, Clone, PartialEq)]
pub struct MasteringRequest {
    pub track_id: String,
    pub target_loudness: Option<f64>,
    pub preset: Option<String>,
}

/// One part of a multipart upload, body already consumed
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedPart {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: usize,
}

/// POST /api/vocal-analysis
#[derive(Debug, Clone, PartialEq)]
pub struct VocalAnalysisRequest {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: usize,
}

/// POST /api/audio/process
#[derive(Debug, Clone, PartialEq)]
pub struct AudioProcessRequest {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: usize,
}

/// GET /api/vst/suggestions
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSuggestionRequest {
    pub genre: String,
    pub track_type: String,
}

/// Insert `key` only when a value was supplied
fn insert_some(prefs: &mut PreferenceSet, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        prefs.insert(key.to_string(), value);
    }
}

impl SongwritingRequest {
    pub fn preferences(&self) -> PreferenceSet {
        let mut prefs = PreferenceSet::new();
        insert_some(&mut prefs, "genre", self.genre.as_ref().map(|v| json!(v)));
        insert_some(&mut prefs, "mood", self.mood.as_ref().map(|v| json!(v)));
        insert_some(&mut prefs, "structure", self.structure.as_ref().map(|v| json!(v)));
        prefs
    }
}

impl LyricsRequest {
    pub fn preferences(&self) -> PreferenceSet {
        let mut prefs = PreferenceSet::new();
        insert_some(&mut prefs, "theme", self.theme.as_ref().map(|v| json!(v)));
        insert_some(&mut prefs, "mood", self.mood.as_ref().map(|v| json!(v)));
        insert_some(&mut prefs, "artist", self.artist.as_ref().map(|v| json!(v)));
        insert_some(&mut prefs, "bpm", self.bpm.map(|v| json!(v)));
        prefs
    }
}

impl MixingRequest {
    pub fn preferences(&self) -> PreferenceSet {
        let mut prefs = PreferenceSet::new();
        insert_some(&mut prefs, "genre", self.genre.as_ref().map(|v| json!(v)));
        insert_some(&mut prefs, "apply_eq", self.apply_eq.map(|v| json!(v)));
        insert_some(&mut prefs, "apply_compression", self.apply_compression.map(|v| json!(v)));
        insert_some(&mut prefs, "reverb_amount", self.reverb_amount.map(|v| json!(v)));
        prefs
    }
}

impl MasteringRequest {
    pub fn preferences(&self) -> PreferenceSet {
        let mut prefs = PreferenceSet::new();
        insert_some(&mut prefs, "target_loudness", self.target_loudness.map(|v| json!(v)));
        insert_some(&mut prefs, "preset", self.preset.as_ref().map(|v| json!(v)));
        prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_not_inserted() {
        let request = MixingRequest {
            track_id: "t1".to_string(),
            genre: None,
            apply_eq: Some(false),
            apply_compression: None,
            reverb_amount: Some(0.0),
        };

        let prefs = request.preferences();
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs["apply_eq"], json!(false));
        assert_eq!(prefs["reverb_amount"], json!(0.0));
        assert!(!prefs.contains_key("track_id"));
    }
}
