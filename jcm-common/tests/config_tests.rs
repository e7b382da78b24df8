//! Unit tests for bootstrap configuration
//!
//! Tests the implementation of:
//! - Missing default TOML file SHALL NOT cause termination
//! - Explicit config path must exist
//! - Priority order: overrides > TOML > compiled defaults
//! - Remote backend requires a URL
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate XDG_CONFIG_HOME are marked with #[serial].

use jcm_common::config::{
    BackendMode, BootstrapOverrides, PluginEntryConfig, ServiceConfig, TomlConfig,
    DEFAULT_BACKEND_TIMEOUT_MS, DEFAULT_BIND_ADDRESS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
};
use jcm_common::Error;
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Should write config file");
    path
}

#[test]
fn test_empty_toml_uses_compiled_defaults() {
    let config = ServiceConfig::resolve(BootstrapOverrides::default(), TomlConfig::default())
        .expect("Defaults should resolve");

    assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.backend.mode, BackendMode::Local);
    assert_eq!(config.backend.url, None);
    assert_eq!(
        config.backend.timeout,
        Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS)
    );
    assert!(config.plugins.is_empty());
}

#[test]
fn test_full_toml_file_parses() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "jcm-ai.toml",
        r#"
bind_address = "0.0.0.0"
port = 9100
max_upload_bytes = 1048576

[logging]
level = "debug"

[backend]
mode = "remote"
url = "http://localhost:9000"
timeout_ms = 1500

[[plugins]]
genre = "lofi"
track_type = "keys"
names = ["RC-20 Retro Color", "Keyscape"]
"#,
    );

    let toml = TomlConfig::load(&path).expect("Should parse config");
    let config = ServiceConfig::resolve(BootstrapOverrides::default(), toml).unwrap();

    assert_eq!(config.bind_address, "0.0.0.0");
    assert_eq!(config.port, 9100);
    assert_eq!(config.max_upload_bytes, 1_048_576);
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.backend.mode, BackendMode::Remote);
    assert_eq!(config.backend.url.as_deref(), Some("http://localhost:9000"));
    assert_eq!(config.backend.timeout, Duration::from_millis(1500));
    assert_eq!(
        config.plugins,
        vec![PluginEntryConfig {
            genre: "lofi".to_string(),
            track_type: "keys".to_string(),
            names: vec!["RC-20 Retro Color".to_string(), "Keyscape".to_string()],
        }]
    );
}

#[test]
fn test_overrides_take_priority_over_toml() {
    let toml = TomlConfig {
        bind_address: Some("0.0.0.0".to_string()),
        port: Some(9100),
        ..Default::default()
    };
    let overrides = BootstrapOverrides {
        bind_address: Some("127.0.0.2".to_string()),
        port: Some(9200),
        backend_url: None,
    };

    let config = ServiceConfig::resolve(overrides, toml).unwrap();
    assert_eq!(config.bind_address, "127.0.0.2");
    assert_eq!(config.port, 9200);
}

#[test]
fn test_backend_url_override_selects_remote_mode() {
    let overrides = BootstrapOverrides {
        backend_url: Some("http://backend:7000".to_string()),
        ..Default::default()
    };

    let config = ServiceConfig::resolve(overrides, TomlConfig::default()).unwrap();
    assert_eq!(config.backend.mode, BackendMode::Remote);
    assert_eq!(config.backend.url.as_deref(), Some("http://backend:7000"));
}

#[test]
fn test_remote_mode_without_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "remote.toml", "[backend]\nmode = \"remote\"\n");

    let toml = TomlConfig::load(&path).unwrap();
    let result = ServiceConfig::resolve(BootstrapOverrides::default(), toml);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "timeout.toml", "[backend]\ntimeout_ms = 0\n");

    let toml = TomlConfig::load(&path).unwrap();
    let result = ServiceConfig::resolve(BootstrapOverrides::default(), toml);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "broken.toml", "port = \"not a number\"\n");

    let result = TomlConfig::load(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_explicit_missing_path_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = TomlConfig::load_or_default(Some(&missing), "jcm-ai");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_missing_default_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let toml = TomlConfig::load_or_default(None, "jcm-ai").expect("Missing file is not fatal");
    assert_eq!(toml.port, None);
    assert_eq!(toml.backend.mode, BackendMode::Local);

    std::env::remove_var("XDG_CONFIG_HOME");
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_default_file_is_picked_up_from_config_dir() {
    let dir = TempDir::new().unwrap();
    let app_dir = dir.path().join("jacameno");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(app_dir.join("jcm-ai.toml"), "port = 9300\n").unwrap();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let toml = TomlConfig::load_or_default(None, "jcm-ai").unwrap();
    assert_eq!(toml.port, Some(9300));

    std::env::remove_var("XDG_CONFIG_HOME");
}
