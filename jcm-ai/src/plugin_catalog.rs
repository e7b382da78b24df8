//! Plugin (VST) recommendation table
//!
//! Keyed by (genre, track type). Genre keys are stored lowercased and
//! lookups lowercase the requested genre; track types match exactly. Any miss
//! resolves to the fallback list, so a lookup never yields an empty list.

use jcm_common::config::PluginEntryConfig;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Generic recommendation used when no entry matches
pub const FALLBACK_PLUGINS: &[&str] = &["Universal Audio UAD", "FabFilter Pro-Q 3", "Soundtoys 5"];

const BUILTIN_ENTRIES: &[(&str, &str, &[&str])] = &[
    ("trap", "drums", &["Kick 2", "Serum", "Omnisphere"]),
    ("trap", "bass", &["SubBoom Bass", "Massive X"]),
    ("trap", "vocals", &["Auto-Tune Pro", "Waves CLA Vocals"]),
    ("rnb", "vocals", &["Melodyne", "Antares Auto-Tune", "Waves Tune Real-Time"]),
    ("rnb", "keys", &["Keyscape", "Omnisphere"]),
    ("rnb", "drums", &["Addictive Drums 2", "Superior Drummer"]),
];

/// Read-only genre × track-type recommendation table
#[derive(Debug, Clone)]
pub struct PluginCatalog {
    entries: HashMap<(String, String), Vec<String>>,
    fallback: Vec<String>,
}

impl PluginCatalog {
    /// Catalog with the built-in entries only
    pub fn builtin() -> Self {
        let entries = BUILTIN_ENTRIES
            .iter()
            .map(|(genre, track_type, names)| {
                (
                    (genre.to_string(), track_type.to_string()),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect();

        Self {
            entries,
            fallback: FALLBACK_PLUGINS.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Add operator-configured entries, replacing built-ins with the same key
    ///
    /// Entries without any plugin names are skipped.
    pub fn with_entries(mut self, extra: &[PluginEntryConfig]) -> Self {
        for entry in extra {
            let names: Vec<String> = entry
                .names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();

            if names.is_empty() {
                warn!(
                    "Skipping plugin entry {}/{}: no plugin names",
                    entry.genre, entry.track_type
                );
                continue;
            }

            debug!(
                "Plugin entry {}/{} -> {} plugins",
                entry.genre,
                entry.track_type,
                names.len()
            );
            self.entries
                .insert((genre_key(&entry.genre), entry.track_type.clone()), names);
        }
        self
    }

    /// Recommended plugins for a genre and track type
    pub fn suggest(&self, genre: &str, track_type: &str) -> &[String] {
        self.entries
            .get(&(genre_key(genre), track_type.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(self.fallback.as_slice())
    }

    /// Number of (genre, track type) entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn genre_key(genre: &str) -> String {
    genre.trim().to_lowercase()
}
