//! jcm-ai - JACAMENO AI services
//!
//! HTTP front end for mixing, mastering, songwriting, lyric generation and
//! vocal coaching. Heavy lifting is delegated to a processing backend: the
//! in-process stub by default, or a remote HTTP service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jcm_ai::backend::{LocalStubBackend, ProcessingBackend, RemoteBackend};
use jcm_ai::{AppState, StudioTables};
use jcm_common::config::{BackendMode, BootstrapOverrides, ServiceConfig, TomlConfig};

const MODULE_NAME: &str = "jcm-ai";

/// Command-line arguments for jcm-ai
#[derive(Parser, Debug)]
#[command(name = "jcm-ai")]
#[command(about = "JACAMENO AI services")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "JCM_AI_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "JCM_AI_BIND")]
    bind: Option<String>,

    /// Config file (default: <config_dir>/jacameno/jcm-ai.toml)
    #[arg(short, long, env = "JCM_AI_CONFIG")]
    config: Option<PathBuf>,

    /// Remote processing service URL; selects the remote backend
    #[arg(long, env = "JCM_BACKEND_URL")]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref(), MODULE_NAME)
        .context("Failed to load configuration")?;
    let overrides = BootstrapOverrides {
        bind_address: args.bind,
        port: args.port,
        backend_url: args.backend_url,
    };
    let config = ServiceConfig::resolve(overrides, toml_config)
        .context("Invalid configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("jcm_ai={0},jcm_common={0},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting jcm-ai v{} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("JCM_GIT_HASH"),
        env!("JCM_BUILD_TIMESTAMP"),
        env!("JCM_BUILD_PROFILE")
    );

    let backend: Arc<dyn ProcessingBackend> = match (config.backend.mode, &config.backend.url) {
        (BackendMode::Remote, Some(url)) => {
            let remote = RemoteBackend::new(url.as_str(), config.backend.timeout)
                .context("Failed to create remote backend client")?;
            info!("Processing backend: remote at {}", remote.base_url());
            Arc::new(remote)
        }
        (BackendMode::Remote, None) => {
            anyhow::bail!("Remote backend selected without a URL");
        }
        (BackendMode::Local, _) => {
            info!("Processing backend: local stub");
            Arc::new(LocalStubBackend::new())
        }
    };

    let tables = StudioTables::with_plugins(&config.plugins);
    info!("Plugin catalog: {} entries", tables.plugins.len());

    let state = AppState::new(tables, backend)
        .with_backend_timeout(config.backend.timeout)
        .with_max_upload_bytes(config.max_upload_bytes);
    let app = jcm_ai::build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
