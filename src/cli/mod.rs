//! Credit Risk CLI Module
//!
//! Command-line interface for serving the model and scoring records offline.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use crate::band::BandMapper;
use crate::explainability::Explainer;
use crate::inference::{Artifacts, Classifier};
use crate::server::{run_server, AppState, ServerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "credit-risk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Credit risk scoring service for a pre-trained XGBoost classifier")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP scoring service
    Serve {
        /// Bind address (defaults to $HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port (defaults to $PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Score one applicant record from a JSON file
    Predict {
        /// JSON object with the applicant fields
        #[arg(short, long)]
        payload: PathBuf,
    },

    /// Show the loaded model artifacts
    Info,
}

pub async fn cmd_serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host.clone()),
        port: port.unwrap_or(defaults.port),
        ..defaults
    };

    section("Credit Risk Model Service");
    println!("  {}", kv("Predict", &format!("http://{}:{}/predict", config.host, config.port)));
    println!("  {}", kv("Health ", &format!("http://{}:{}/health", config.host, config.port)));
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    run_server(config).await
}

pub fn cmd_predict(payload_path: &PathBuf) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(payload_path)
        .with_context(|| format!("Failed to read {}", payload_path.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", payload_path.display()))?;

    let state = AppState::load(ServerConfig::default()).context("Failed to load artifacts")?;
    let response = state.predict(&payload)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub fn cmd_info() -> anyhow::Result<()> {
    let config = ServerConfig::default();
    let artifacts = Artifacts::load(&config.artifacts).context("Failed to load artifacts")?;

    section("Artifacts");
    println!("  {}", kv("Model    ", &config.artifacts.model.display().to_string()));
    println!("  {}", kv("Encoder  ", &config.artifacts.encoder.display().to_string()));
    println!("  {}", kv("Features ", &config.artifacts.features.display().to_string()));

    section("Model");
    println!("  {}", kv("Objective", artifacts.classifier.objective_name()));
    println!("  {}", kv("Trees    ", &artifacts.classifier.n_trees().to_string()));
    println!("  {}", kv("Features ", &artifacts.classifier.n_features().to_string()));
    println!("  {}", kv("Classes  ", &artifacts.labels.classes().join(", ")));

    section("Risk bands");
    let bands = BandMapper::default().with_fallback(config.fallback_band.clone());
    for (label, band) in bands.bands() {
        let marker = if artifacts.labels.classes().contains(label) { "" } else { "  (not a model class)" };
        println!("  {}{}", kv(&format!("{:<9}", label), band), dim(marker));
    }
    println!("  {}", kv("otherwise", bands.fallback()));

    section("Top features");
    let explainer = Explainer::from_classifier(&artifacts.schema, &artifacts.classifier);
    let top = explainer.explain(config.explain_top_k);
    if top.is_empty() {
        println!("  {}", dim("model exposes no feature importances"));
    }
    for line in top {
        println!("  {}", line);
    }
    println!();
    Ok(())
}
