//! Request validators
//!
//! Turn raw client input into the typed requests in [`crate::models`].
//! Every field of a request is checked before anything downstream runs;
//! the first violation is returned as a [`ValidationError`] naming the field.
//!
//! JSON `null` for an optional field is treated as if the field were absent.
//! Option keys shared with the default table (`reverb_amount`,
//! `target_loudness`, `bpm`, ...) are checked against the same key specs the
//! preference resolver uses, so the two layers cannot disagree on ranges.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::{
    AudioAnalysisRequest, AudioProcessRequest, LyricsRequest, MasteringRequest, MixMasterRequest, MixingRequest,
    PluginSuggestionRequest, SongwritingRequest, UploadedPart, VocalAnalysisRequest,
    VocalCoachRequest,
};
use crate::preferences::{key_spec, keys_for, OperationKind, PrefValue, PreferenceSet};

/// Multipart field carrying uploaded audio
pub const UPLOAD_FIELD: &str = "file";

type Fields = Map<String, Value>;

fn object(body: &Value) -> Result<&Fields, ValidationError> {
    body.as_object()
        .ok_or_else(|| ValidationError::new("body", "expected a JSON object"))
}

/// Field value, with `null` folded into absence
fn present<'a>(fields: &'a Fields, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

fn required_text(fields: &Fields, name: &str) -> Result<String, ValidationError> {
    match present(fields, name) {
        None => Err(ValidationError::new(name, "field is required")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(ValidationError::new(name, "must not be blank"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::new(name, "expected a string")),
    }
}

fn optional_text(fields: &Fields, name: &str) -> Result<Option<String>, ValidationError> {
    match present(fields, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::new(name, "expected a string")),
    }
}

/// Check an optional field against the default-table spec for `kind`
fn optional_pref(
    fields: &Fields,
    kind: OperationKind,
    name: &str,
) -> Result<Option<PrefValue>, ValidationError> {
    let spec = key_spec(kind, name)
        .ok_or_else(|| ValidationError::new(name, format!("not an option for {}", kind)))?;
    match fields.get(name) {
        Some(value) => spec.coerce(value),
        None => Ok(None),
    }
}

/// POST /api/mix-master
pub fn validate_mix_master(body: &Value) -> Result<MixMasterRequest, ValidationError> {
    let fields = object(body)?;

    let tracks = match present(fields, "tracks") {
        None => return Err(ValidationError::new("tracks", "field is required")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::new("tracks", "expected an array")),
    };
    if tracks.is_empty() {
        return Err(ValidationError::new("tracks", "must contain at least one track"));
    }
    if let Some(i) = tracks.iter().position(|t| !t.is_object()) {
        return Err(ValidationError::new(
            format!("tracks[{}]", i),
            "expected a track object",
        ));
    }

    let preferences: PreferenceSet = match present(fields, "preferences") {
        None => PreferenceSet::new(),
        Some(Value::Object(prefs)) => prefs.clone(),
        Some(_) => return Err(ValidationError::new("preferences", "expected an object")),
    };

    // Both stages read from the same preference object
    for kind in [OperationKind::Mix, OperationKind::Master] {
        for spec in keys_for(kind) {
            if let Some(value) = preferences.get(spec.name) {
                spec.coerce(value).map_err(|e| e.nested("preferences"))?;
            }
        }
    }

    Ok(MixMasterRequest {
        tracks: tracks.clone(),
        preferences,
    })
}

/// POST /api/songwriting
pub fn validate_songwriting(body: &Value) -> Result<SongwritingRequest, ValidationError> {
    let fields = object(body)?;
    let kind = OperationKind::Songwriting;

    Ok(SongwritingRequest {
        prompt: required_text(fields, "prompt")?,
        genre: optional_pref(fields, kind, "genre")?.and_then(PrefValue::into_text),
        mood: optional_pref(fields, kind, "mood")?.and_then(PrefValue::into_text),
        structure: optional_pref(fields, kind, "structure")?.and_then(PrefValue::into_text_list),
    })
}

/// POST /api/vocal-coach
pub fn validate_vocal_coach(body: &Value) -> Result<VocalCoachRequest, ValidationError> {
    let fields = object(body)?;

    Ok(VocalCoachRequest {
        audio_url: required_text(fields, "audioUrl")?,
        target_style: optional_text(fields, "targetStyle")?,
    })
}

/// POST /api/analyze-audio
pub fn validate_audio_analysis(body: &Value) -> Result<AudioAnalysisRequest, ValidationError> {
    let fields = object(body)?;

    Ok(AudioAnalysisRequest {
        audio_url: required_text(fields, "audioUrl")?,
    })
}

/// POST /api/lyrics
pub fn validate_lyrics(body: &Value) -> Result<LyricsRequest, ValidationError> {
    let fields = object(body)?;
    let kind = OperationKind::Lyrics;

    Ok(LyricsRequest {
        style: required_text(fields, "style")?,
        theme: optional_pref(fields, kind, "theme")?.and_then(PrefValue::into_text),
        mood: optional_pref(fields, kind, "mood")?.and_then(PrefValue::into_text),
        artist: optional_pref(fields, kind, "artist")?.and_then(PrefValue::into_text),
        // Range already enforced by the key spec
        bpm: optional_pref(fields, kind, "bpm")?
            .and_then(|v| v.as_number())
            .map(|n| n as u32),
    })
}

/// POST /api/mixing
pub fn validate_mixing(body: &Value) -> Result<MixingRequest, ValidationError> {
    let fields = object(body)?;
    let kind = OperationKind::Mixing;

    Ok(MixingRequest {
        track_id: required_text(fields, "track_id")?,
        genre: optional_pref(fields, kind, "genre")?.and_then(PrefValue::into_text),
        apply_eq: optional_pref(fields, kind, "apply_eq")?.and_then(|v| v.as_flag()),
        apply_compression: optional_pref(fields, kind, "apply_compression")?
            .and_then(|v| v.as_flag()),
        reverb_amount: optional_pref(fields, kind, "reverb_amount")?.and_then(|v| v.as_number()),
    })
}

/// POST /api/mastering
pub fn validate_mastering(body: &Value) -> Result<MasteringRequest, ValidationError> {
    let fields = object(body)?;
    let kind = OperationKind::Mastering;

    Ok(MasteringRequest {
        track_id: required_text(fields, "track_id")?,
        target_loudness: optional_pref(fields, kind, "target_loudness")?
            .and_then(|v| v.as_number()),
        preset: optional_pref(fields, kind, "preset")?.and_then(PrefValue::into_text),
    })
}

/// POST /api/vocal-analysis (multipart)
pub fn validate_vocal_analysis(parts: &[UploadedPart]) -> Result<VocalAnalysisRequest, ValidationError> {
    let part = upload_part(parts)?;
    Ok(VocalAnalysisRequest {
        file_name: part.file_name.clone(),
        content_type: part.content_type.clone(),
        size_bytes: part.size_bytes,
    })
}

/// POST /api/audio/process (multipart)
pub fn validate_audio_process(parts: &[UploadedPart]) -> Result<AudioProcessRequest, ValidationError> {
    let part = upload_part(parts)?;
    Ok(AudioProcessRequest {
        file_name: part.file_name.clone(),
        content_type: part.content_type.clone(),
        size_bytes: part.size_bytes,
    })
}

/// The non-empty `file` part of a multipart upload
fn upload_part(parts: &[UploadedPart]) -> Result<&UploadedPart, ValidationError> {
    let part = parts
        .iter()
        .find(|p| p.field_name == UPLOAD_FIELD)
        .ok_or_else(|| ValidationError::new(UPLOAD_FIELD, "audio file is required"))?;

    if part.size_bytes == 0 {
        return Err(ValidationError::new(UPLOAD_FIELD, "audio file is empty"));
    }
    Ok(part)
}

/// GET /api/vst/suggestions
///
/// Both parameters are required but may be empty.
pub fn validate_plugin_query(
    genre: Option<String>,
    track_type: Option<String>,
) -> Result<PluginSuggestionRequest, ValidationError> {
    Ok(PluginSuggestionRequest {
        genre: genre.ok_or_else(|| ValidationError::new("genre", "query parameter is required"))?,
        track_type: track_type
            .ok_or_else(|| ValidationError::new("track_type", "query parameter is required"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_must_be_object() {
        let err = validate_mixing(&json!([1, 2])).unwrap_err();
        assert_eq!(err.field, "body");
    }

    #[test]
    fn test_mixing_required_and_optional_fields() {
        let request = validate_mixing(&json!({
            "track_id": "t1",
            "apply_eq": true,
            "apply_compression": false,
            "reverb_amount": 0.3,
        }))
        .unwrap();

        assert_eq!(request.track_id, "t1");
        assert_eq!(request.genre, None);
        assert_eq!(request.apply_eq, Some(true));
        assert_eq!(request.apply_compression, Some(false));
        assert_eq!(request.reverb_amount, Some(0.3));

        let err = validate_mixing(&json!({"apply_eq": true})).unwrap_err();
        assert_eq!(err.field, "track_id");

        let err = validate_mixing(&json!({"track_id": "   "})).unwrap_err();
        assert_eq!(err.field, "track_id");

        let err = validate_mixing(&json!({"track_id": 7})).unwrap_err();
        assert_eq!(err.field, "track_id");
    }

    #[test]
    fn test_reverb_range() {
        for ok in [0.0, 1.0] {
            assert!(validate_mixing(&json!({"track_id": "t", "reverb_amount": ok})).is_ok());
        }
        for bad in [-0.1, 1.5] {
            let err = validate_mixing(&json!({"track_id": "t", "reverb_amount": bad})).unwrap_err();
            assert_eq!(err.field, "reverb_amount");
        }
    }

    #[test]
    fn test_target_loudness_boundaries() {
        for ok in [-40.0, 0.0] {
            let request =
                validate_mastering(&json!({"track_id": "t1", "target_loudness": ok})).unwrap();
            assert_eq!(request.target_loudness, Some(ok));
        }
        for bad in [-41.0, 1.0] {
            let err =
                validate_mastering(&json!({"track_id": "t1", "target_loudness": bad})).unwrap_err();
            assert_eq!(err.field, "target_loudness");
        }
    }

    #[test]
    fn test_null_optional_is_absent() {
        let request = validate_mastering(&json!({
            "track_id": "t1",
            "target_loudness": null,
            "preset": null,
        }))
        .unwrap();
        assert_eq!(request.target_loudness, None);
        assert_eq!(request.preset, None);
    }

    #[test]
    fn test_first_error_short_circuits() {
        // Missing track_id is reported before the bad reverb
        let err = validate_mixing(&json!({"reverb_amount": 9})).unwrap_err();
        assert_eq!(err.field, "track_id");
    }

    #[test]
    fn test_mix_master_tracks() {
        let request = validate_mix_master(&json!({
            "tracks": [{"id": 1}, {"id": 2}, {"id": 3}],
        }))
        .unwrap();
        assert_eq!(request.tracks.len(), 3);
        assert!(request.preferences.is_empty());

        assert_eq!(validate_mix_master(&json!({})).unwrap_err().field, "tracks");
        assert_eq!(
            validate_mix_master(&json!({"tracks": []})).unwrap_err().field,
            "tracks"
        );
        assert_eq!(
            validate_mix_master(&json!({"tracks": [{"id": 1}, "b"]})).unwrap_err().field,
            "tracks[1]"
        );
    }

    #[test]
    fn test_mix_master_preferences_checked() {
        let err = validate_mix_master(&json!({
            "tracks": [{"id": 1}],
            "preferences": {"intensity": "loud"},
        }))
        .unwrap_err();
        assert_eq!(err.field, "preferences.intensity");

        let err = validate_mix_master(&json!({
            "tracks": [{"id": 1}],
            "preferences": {"targetLoudness": 3},
        }))
        .unwrap_err();
        assert_eq!(err.field, "preferences.targetLoudness");

        let err = validate_mix_master(&json!({
            "tracks": [{"id": 1}],
            "preferences": "loud",
        }))
        .unwrap_err();
        assert_eq!(err.field, "preferences");

        // Unknown keys pass through untouched
        let request = validate_mix_master(&json!({
            "tracks": [{"id": 1}],
            "preferences": {"sparkle": 11},
        }))
        .unwrap();
        assert_eq!(request.preferences["sparkle"], json!(11));
    }

    #[test]
    fn test_songwriting_structure() {
        let request = validate_songwriting(&json!({
            "prompt": "summer",
            "structure": ["verse", "chorus"],
        }))
        .unwrap();
        assert_eq!(
            request.structure,
            Some(vec!["verse".to_string(), "chorus".to_string()])
        );

        let err = validate_songwriting(&json!({"prompt": "x", "structure": "verse"})).unwrap_err();
        assert_eq!(err.field, "structure");

        let err = validate_songwriting(&json!({"genre": "pop"})).unwrap_err();
        assert_eq!(err.field, "prompt");
    }

    #[test]
    fn test_lyrics_bpm() {
        let request = validate_lyrics(&json!({"style": "trap", "bpm": 140})).unwrap();
        assert_eq!(request.bpm, Some(140));

        let err = validate_lyrics(&json!({"style": "trap", "bpm": 500})).unwrap_err();
        assert_eq!(err.field, "bpm");

        let err = validate_lyrics(&json!({"bpm": 100})).unwrap_err();
        assert_eq!(err.field, "style");
    }

    #[test]
    fn test_vocal_coach_fields() {
        let request = validate_vocal_coach(&json!({
            "audioUrl": "https://example.com/take1.mp3",
            "targetStyle": "pop",
        }))
        .unwrap();
        assert_eq!(request.target_style.as_deref(), Some("pop"));

        let err = validate_vocal_coach(&json!({"audioUrl": "u", "targetStyle": 5})).unwrap_err();
        assert_eq!(err.field, "targetStyle");

        let err = validate_audio_analysis(&json!({})).unwrap_err();
        assert_eq!(err.field, "audioUrl");
    }

    #[test]
    fn test_vocal_analysis_upload() {
        let part = |name: &str, size: usize| UploadedPart {
            field_name: name.to_string(),
            file_name: Some("take.wav".to_string()),
            content_type: Some("audio/wav".to_string()),
            size_bytes: size,
        };

        let request = validate_vocal_analysis(&[part("file", 1024)]).unwrap();
        assert_eq!(request.size_bytes, 1024);

        assert_eq!(
            validate_vocal_analysis(&[part("other", 10)]).unwrap_err().field,
            "file"
        );
        assert_eq!(validate_vocal_analysis(&[part("file", 0)]).unwrap_err().field, "file");
    }

    #[test]
    fn test_audio_process_upload() {
        let parts = [
            UploadedPart {
                field_name: "notes".to_string(),
                file_name: None,
                content_type: None,
                size_bytes: 12,
            },
            UploadedPart {
                field_name: "file".to_string(),
                file_name: Some("loop.flac".to_string()),
                content_type: Some("audio/flac".to_string()),
                size_bytes: 2048,
            },
        ];
        let request = validate_audio_process(&parts).unwrap();
        assert_eq!(request.file_name.as_deref(), Some("loop.flac"));
        assert_eq!(request.size_bytes, 2048);

        let err = validate_audio_process(&parts[..1]).unwrap_err();
        assert_eq!(err.field, "file");
        assert_eq!(err.constraint, "audio file is required");
    }

    #[test]
    fn test_plugin_query_requires_both() {
        assert!(validate_plugin_query(Some(String::new()), Some(String::new())).is_ok());
        assert_eq!(
            validate_plugin_query(None, Some("drums".to_string())).unwrap_err().field,
            "genre"
        );
        assert_eq!(
            validate_plugin_query(Some("trap".to_string()), None).unwrap_err().field,
            "track_type"
        );
    }
}
