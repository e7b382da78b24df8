//! jcm-ai library interface
//!
//! Exposes the router and its building blocks for the binary and for
//! integration testing.

pub mod api;
pub mod backend;
pub mod composer;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod plugin_catalog;
pub mod preferences;
pub mod validators;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use jcm_common::config::{PluginEntryConfig, DEFAULT_BACKEND_TIMEOUT_MS, DEFAULT_MAX_UPLOAD_BYTES};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::ProcessingBackend;
use crate::plugin_catalog::PluginCatalog;
use crate::preferences::DefaultTable;

/// Read-only lookup tables built once at startup
#[derive(Debug, Clone)]
pub struct StudioTables {
    pub defaults: DefaultTable,
    pub plugins: PluginCatalog,
}

impl StudioTables {
    /// Built-in defaults and plugin entries
    pub fn builtin() -> Self {
        Self {
            defaults: DefaultTable::builtin(),
            plugins: PluginCatalog::builtin(),
        }
    }

    /// Built-ins plus operator-configured plugin entries
    pub fn with_plugins(extra: &[PluginEntryConfig]) -> Self {
        Self {
            defaults: DefaultTable::builtin(),
            plugins: PluginCatalog::builtin().with_entries(extra),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Preference defaults and plugin recommendations
    pub tables: Arc<StudioTables>,
    /// Analysis / generation / mixing / mastering engine
    pub backend: Arc<dyn ProcessingBackend>,
    /// Deadline for each backend dispatch
    pub backend_timeout: Duration,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(tables: StudioTables, backend: Arc<dyn ProcessingBackend>) -> Self {
        Self {
            tables: Arc::new(tables),
            backend,
            backend_timeout: Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            startup_time: Utc::now(),
        }
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(api::health_routes())
        .merge(api::mixing_routes())
        .merge(api::creative_routes())
        .merge(api::analysis_routes())
        .merge(api::plugin_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
