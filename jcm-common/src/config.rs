//! Bootstrap configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment tiers are merged by the binary (clap `env`)
//! and arrive here as [`BootstrapOverrides`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default deadline for a single backend call
pub const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 30_000;

/// Default request body limit (uploads included)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent values fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Address to bind the HTTP listener to
    #[serde(default)]
    pub bind_address: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Maximum accepted request body size in bytes
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Processing backend selection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Additional plugin recommendations (`[[plugins]]` tables)
    #[serde(default)]
    pub plugins: Vec<PluginEntryConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which processing backend implementation to run against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// In-process deterministic stub
    #[default]
    Local,
    /// HTTP/JSON processing service
    Remote,
}

/// Processing backend section (`[backend]`)
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,

    /// Base URL of the remote processing service
    #[serde(default)]
    pub url: Option<String>,

    /// Deadline for one backend call, in milliseconds
    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            url: None,
            timeout_ms: default_backend_timeout_ms(),
        }
    }
}

fn default_backend_timeout_ms() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_MS
}

/// One operator-supplied plugin recommendation entry
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PluginEntryConfig {
    pub genre: String,
    pub track_type: String,
    pub names: Vec<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file for `module_name`
    ///
    /// An explicit path must exist. Without one, the platform config
    /// directory is tried (`<config_dir>/jacameno/<module_name>.toml`) and a
    /// missing file yields defaults with a warning.
    pub fn load_or_default(explicit: Option<&Path>, module_name: &str) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading configuration from {}", path.display());
            return Self::load(path);
        }

        match default_config_path(module_name) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            Some(path) => {
                warn!(
                    "No config file at {}, using compiled defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform config file location for a module
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jacameno").join(format!("{}.toml", module_name)))
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct BootstrapOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub backend_url: Option<String>,
}

/// Resolved backend settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub mode: BackendMode,
    pub url: Option<String>,
    pub timeout: Duration,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub log_level: String,
    pub backend: BackendSettings,
    pub plugins: Vec<PluginEntryConfig>,
}

impl ServiceConfig {
    /// Merge overrides over the TOML file over compiled defaults
    ///
    /// A backend URL given as an override selects remote mode.
    pub fn resolve(overrides: BootstrapOverrides, toml: TomlConfig) -> Result<Self> {
        let bind_address = overrides
            .bind_address
            .or(toml.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let port = overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let max_upload_bytes = toml.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let (mode, url) = match overrides.backend_url {
            Some(url) => (BackendMode::Remote, Some(url)),
            None => (toml.backend.mode, toml.backend.url),
        };

        if mode == BackendMode::Remote && url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(Error::Config(
                "Remote backend selected but no backend URL configured".to_string(),
            ));
        }

        if toml.backend.timeout_ms == 0 {
            return Err(Error::Config(
                "backend.timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            port,
            max_upload_bytes,
            log_level: toml.logging.level,
            backend: BackendSettings {
                mode,
                url,
                timeout: Duration::from_millis(toml.backend.timeout_ms),
            },
            plugins: toml.plugins,
        })
    }
}
