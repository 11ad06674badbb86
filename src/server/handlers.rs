//! HTTP request handlers

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// Prediction
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_class: String,
    pub probabilities: BTreeMap<String, f64>,
    pub band: String,
    pub explanation: Vec<String>,
    pub features_used: Vec<String>,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    request: std::result::Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let Json(request) = request.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let started = Instant::now();
    let response = state.predict(&request.payload)?;
    debug!(
        predicted_class = %response.predicted_class,
        band = %response.band,
        latency_us = started.elapsed().as_micros() as u64,
        "Prediction served"
    );

    Ok(Json(response))
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
