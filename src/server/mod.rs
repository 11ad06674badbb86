//! Credit Risk Scoring Server Module
//!
//! HTTP front end for the scoring pipeline. Exposes a health check and a
//! single prediction endpoint over artifacts loaded at startup.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::{PredictRequest, PredictResponse};
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use tracing::{error, info};

use crate::band::DEFAULT_FALLBACK_BAND;
use crate::inference::ArtifactPaths;
use crate::preprocessing::PreprocessingConfig;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_EXPLAIN_TOP_K: usize = 5;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub artifacts: ArtifactPaths,
    pub preprocessing: PreprocessingConfig,
    pub fallback_band: String,
    pub explain_top_k: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            allowed_origins: parse_origins(
                &std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            artifacts: ArtifactPaths::default(),
            preprocessing: PreprocessingConfig::default(),
            fallback_band: std::env::var("FALLBACK_BAND")
                .ok()
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FALLBACK_BAND.to_string()),
            explain_top_k: std::env::var("EXPLAIN_TOP_K")
                .ok()
                .and_then(|k| k.parse().ok())
                .unwrap_or(DEFAULT_EXPLAIN_TOP_K),
        }
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

/// Load artifacts and serve until ctrl+c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let state = AppState::load(config.clone()).context("Failed to load artifacts")?;
    let start_time = state.started_at;
    info!(
        n_features = state.preprocessor.schema().len(),
        classes = ?state.engine.labels().classes(),
        fallback_band = %state.bands.fallback(),
        allowed_origins = ?config.allowed_origins,
        "Scoring pipeline ready"
    );

    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install ctrl+c handler, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
