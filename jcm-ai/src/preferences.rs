//! Preference resolution
//!
//! Merges a partial, client-supplied [`PreferenceSet`] over the named
//! defaults for an [`OperationKind`], producing a [`ResolvedConfig`] that
//! holds exactly one value for every key the kind defines.
//!
//! The merge runs in two passes:
//! 1. copy every default for the kind,
//! 2. for each key the kind defines, overwrite with the client value when one
//!    is present and non-null, after coercing it against the key's spec.
//!
//! Unknown client keys are never visited, so they cannot leak into the
//! result. `null` means "use the default"; falsy values (`0`, `false`, `""`)
//! are real overrides.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CompositionError, ValidationError};

/// Client preferences as received (JSON object)
pub type PreferenceSet = serde_json::Map<String, Value>;

/// Reverb wetness bounds
pub const REVERB_MIN: f64 = 0.0;
pub const REVERB_MAX: f64 = 1.0;

/// Target loudness bounds in dB (LUFS)
pub const LOUDNESS_MIN_DB: f64 = -40.0;
pub const LOUDNESS_MAX_DB: f64 = 0.0;

/// Tempo bounds for lyric generation
pub const BPM_MIN: f64 = 40.0;
pub const BPM_MAX: f64 = 240.0;

/// Mixing intensity levels
pub const INTENSITY_LEVELS: &[&str] = &["low", "medium", "high"];

/// Operation families with their own default table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Mix stage of `/api/mix-master`
    Mix,
    /// Master stage of `/api/mix-master`
    Master,
    /// `/api/mixing`
    Mixing,
    /// `/api/mastering`
    Mastering,
    /// `/api/lyrics`
    Lyrics,
    /// `/api/songwriting`
    Songwriting,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Mix,
        OperationKind::Master,
        OperationKind::Mixing,
        OperationKind::Mastering,
        OperationKind::Lyrics,
        OperationKind::Songwriting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Mix => "mix",
            OperationKind::Master => "master",
            OperationKind::Mixing => "mixing",
            OperationKind::Mastering => "mastering",
            OperationKind::Lyrics => "lyrics",
            OperationKind::Songwriting => "songwriting",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved option value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrefValue {
    Flag(bool),
    Number(f64),
    Text(String),
    TextList(Vec<String>),
}

impl PrefValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PrefValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PrefValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            PrefValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_text_list(self) -> Option<Vec<String>> {
        match self {
            PrefValue::TextList(items) => Some(items),
            _ => None,
        }
    }
}

/// Compile-time default for a key
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Flag(bool),
    Number(f64),
    Text(&'static str),
    TextList(&'static [&'static str]),
}

impl DefaultValue {
    fn to_value(self) -> PrefValue {
        match self {
            DefaultValue::Flag(b) => PrefValue::Flag(b),
            DefaultValue::Number(n) => PrefValue::Number(n),
            DefaultValue::Text(s) => PrefValue::Text(s.to_string()),
            DefaultValue::TextList(items) => {
                PrefValue::TextList(items.iter().map(|s| s.to_string()).collect())
            }
        }
    }
}

/// Accepted shape of a key's value
#[derive(Debug, Clone, Copy)]
pub enum KeyKind {
    /// Free-form string
    Text,
    /// One of a fixed set, matched case-insensitively
    Choice(&'static [&'static str]),
    /// Boolean
    Flag,
    /// Number within inclusive bounds
    Number { min: f64, max: f64 },
    /// Whole number within inclusive bounds
    Integer { min: f64, max: f64 },
    /// Array of non-blank strings
    TextList,
}

/// Definition of a single configurable key
#[derive(Debug, Clone, Copy)]
pub struct KeySpec {
    pub name: &'static str,
    pub kind: KeyKind,
    pub default: DefaultValue,
}

impl KeySpec {
    const fn new(name: &'static str, kind: KeyKind, default: DefaultValue) -> Self {
        Self { name, kind, default }
    }

    /// Coerce a client value against this key
    ///
    /// Returns `Ok(None)` for JSON `null` (use default).
    pub fn coerce(&self, value: &Value) -> Result<Option<PrefValue>, ValidationError> {
        if value.is_null() {
            return Ok(None);
        }
        let invalid = |constraint: String| ValidationError::new(self.name, constraint);

        let coerced = match self.kind {
            KeyKind::Text => match value {
                Value::String(s) => PrefValue::Text(s.clone()),
                _ => return Err(invalid("expected a string".to_string())),
            },
            KeyKind::Choice(options) => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| invalid(format!("expected one of {}", options.join(", "))))?;
                let normalized = raw.trim().to_lowercase();
                if !options.contains(&normalized.as_str()) {
                    return Err(invalid(format!(
                        "'{}' is not one of {}",
                        raw,
                        options.join(", ")
                    )));
                }
                PrefValue::Text(normalized)
            }
            KeyKind::Flag => match value {
                Value::Bool(b) => PrefValue::Flag(*b),
                _ => return Err(invalid("expected a boolean".to_string())),
            },
            KeyKind::Number { min, max } => {
                let n = finite_number(value).ok_or_else(|| invalid("expected a number".to_string()))?;
                check_bounds(n, min, max).map_err(invalid)?;
                PrefValue::Number(n)
            }
            KeyKind::Integer { min, max } => {
                let n = finite_number(value)
                    .ok_or_else(|| invalid("expected an integer".to_string()))?;
                if n.fract() != 0.0 {
                    return Err(invalid("expected an integer".to_string()));
                }
                check_bounds(n, min, max).map_err(invalid)?;
                PrefValue::Number(n)
            }
            KeyKind::TextList => {
                let items = value
                    .as_array()
                    .ok_or_else(|| invalid("expected an array of strings".to_string()))?;
                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item.as_str() {
                        Some(s) if !s.trim().is_empty() => list.push(s.to_string()),
                        _ => {
                            return Err(ValidationError::new(
                                format!("{}[{}]", self.name, i),
                                "expected a non-empty string",
                            ))
                        }
                    }
                }
                PrefValue::TextList(list)
            }
        };

        Ok(Some(coerced))
    }
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn check_bounds(n: f64, min: f64, max: f64) -> Result<(), String> {
    if n < min || n > max {
        Err(format!("{} is outside the range [{}, {}]", n, min, max))
    } else {
        Ok(())
    }
}

const MIX_KEYS: &[KeySpec] = &[
    KeySpec::new("genre", KeyKind::Text, DefaultValue::Text("auto")),
    KeySpec::new("intensity", KeyKind::Choice(INTENSITY_LEVELS), DefaultValue::Text("medium")),
    KeySpec::new("eq", KeyKind::Flag, DefaultValue::Flag(true)),
    KeySpec::new("compression", KeyKind::Flag, DefaultValue::Flag(true)),
    KeySpec::new("spatialEnhancement", KeyKind::Flag, DefaultValue::Flag(true)),
];

const MASTER_KEYS: &[KeySpec] = &[
    KeySpec::new(
        "targetLoudness",
        KeyKind::Number { min: LOUDNESS_MIN_DB, max: LOUDNESS_MAX_DB },
        DefaultValue::Number(-14.0),
    ),
    KeySpec::new("limiting", KeyKind::Flag, DefaultValue::Flag(true)),
];

const MIXING_KEYS: &[KeySpec] = &[
    // Empty genre means no genre preset
    KeySpec::new("genre", KeyKind::Text, DefaultValue::Text("")),
    KeySpec::new("apply_eq", KeyKind::Flag, DefaultValue::Flag(true)),
    KeySpec::new("apply_compression", KeyKind::Flag, DefaultValue::Flag(true)),
    KeySpec::new(
        "reverb_amount",
        KeyKind::Number { min: REVERB_MIN, max: REVERB_MAX },
        DefaultValue::Number(0.3),
    ),
];

const MASTERING_KEYS: &[KeySpec] = &[
    KeySpec::new(
        "target_loudness",
        KeyKind::Number { min: LOUDNESS_MIN_DB, max: LOUDNESS_MAX_DB },
        DefaultValue::Number(-14.0),
    ),
    KeySpec::new("preset", KeyKind::Text, DefaultValue::Text("balanced")),
];

const LYRICS_KEYS: &[KeySpec] = &[
    KeySpec::new("theme", KeyKind::Text, DefaultValue::Text("life")),
    KeySpec::new("mood", KeyKind::Text, DefaultValue::Text("uplifting")),
    KeySpec::new("artist", KeyKind::Text, DefaultValue::Text("")),
    KeySpec::new(
        "bpm",
        KeyKind::Integer { min: BPM_MIN, max: BPM_MAX },
        DefaultValue::Number(90.0),
    ),
];

const SONGWRITING_KEYS: &[KeySpec] = &[
    KeySpec::new("genre", KeyKind::Text, DefaultValue::Text("pop")),
    KeySpec::new("mood", KeyKind::Text, DefaultValue::Text("uplifting")),
    KeySpec::new(
        "structure",
        KeyKind::TextList,
        DefaultValue::TextList(&["verse", "chorus", "verse", "chorus", "bridge", "chorus"]),
    ),
];

/// Look up the spec for one key of an operation kind
pub fn key_spec(kind: OperationKind, name: &str) -> Option<&'static KeySpec> {
    keys_for(kind).iter().find(|spec| spec.name == name)
}

/// Key specs for an operation kind, in declaration order
pub fn keys_for(kind: OperationKind) -> &'static [KeySpec] {
    match kind {
        OperationKind::Mix => MIX_KEYS,
        OperationKind::Master => MASTER_KEYS,
        OperationKind::Mixing => MIXING_KEYS,
        OperationKind::Mastering => MASTERING_KEYS,
        OperationKind::Lyrics => LYRICS_KEYS,
        OperationKind::Songwriting => SONGWRITING_KEYS,
    }
}

/// Complete configuration for one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    kind: OperationKind,
    values: BTreeMap<&'static str, PrefValue>,
}

impl ResolvedConfig {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn missing(&self, key: &str, expected: &'static str) -> CompositionError {
        CompositionError {
            kind: self.kind,
            key: key.to_string(),
            expected,
        }
    }

    pub fn flag(&self, key: &str) -> Result<bool, CompositionError> {
        match self.values.get(key) {
            Some(PrefValue::Flag(b)) => Ok(*b),
            _ => Err(self.missing(key, "flag")),
        }
    }

    pub fn number(&self, key: &str) -> Result<f64, CompositionError> {
        match self.values.get(key) {
            Some(PrefValue::Number(n)) => Ok(*n),
            _ => Err(self.missing(key, "number")),
        }
    }

    pub fn text(&self, key: &str) -> Result<&str, CompositionError> {
        match self.values.get(key) {
            Some(PrefValue::Text(s)) => Ok(s),
            _ => Err(self.missing(key, "text")),
        }
    }

    pub fn text_list(&self, key: &str) -> Result<&[String], CompositionError> {
        match self.values.get(key) {
            Some(PrefValue::TextList(items)) => Ok(items),
            _ => Err(self.missing(key, "text list")),
        }
    }
}

/// Process-wide default table, keyed by operation kind
///
/// Built once at startup; read-only afterwards.
#[derive(Debug, Clone)]
pub struct DefaultTable {
    entries: BTreeMap<OperationKind, &'static [KeySpec]>,
}

impl DefaultTable {
    /// Table with the built-in defaults for every operation kind
    pub fn builtin() -> Self {
        let entries = OperationKind::ALL
            .iter()
            .map(|kind| (*kind, keys_for(*kind)))
            .collect();
        Self { entries }
    }

    /// Key specs defined for `kind`
    pub fn keys(&self, kind: OperationKind) -> &'static [KeySpec] {
        self.entries.get(&kind).copied().unwrap_or(&[])
    }

    /// Pure defaults for `kind`
    pub fn defaults(&self, kind: OperationKind) -> ResolvedConfig {
        let values = self
            .keys(kind)
            .iter()
            .map(|spec| (spec.name, spec.default.to_value()))
            .collect();
        ResolvedConfig { kind, values }
    }

    /// Merge client preferences over the defaults for `kind`
    pub fn resolve(
        &self,
        kind: OperationKind,
        prefs: &PreferenceSet,
    ) -> Result<ResolvedConfig, ValidationError> {
        // Pass 1: defaults
        let mut config = self.defaults(kind);

        // Pass 2: presence-checked overrides, defined keys only
        for spec in self.keys(kind) {
            if let Some(raw) = prefs.get(spec.name) {
                if let Some(value) = spec.coerce(raw)? {
                    config.values.insert(spec.name, value);
                }
            }
        }

        Ok(config)
    }
}
