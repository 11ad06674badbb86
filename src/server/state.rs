//! Application state management

use std::sync::Arc;
use serde_json::Value;

use crate::band::BandMapper;
use crate::error::Result;
use crate::explainability::Explainer;
use crate::inference::{Artifacts, InferenceEngine};
use crate::preprocessing::Preprocessor;

use super::handlers::PredictResponse;
use super::ServerConfig;

/// Read-only service context shared across handlers.
///
/// Built once from the loaded artifacts before the listener is bound and never
/// mutated afterwards, so handlers need no locking.
pub struct AppState {
    pub config: ServerConfig,
    pub preprocessor: Preprocessor,
    pub engine: InferenceEngine,
    pub bands: BandMapper,
    pub explainer: Explainer,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Assemble the pipeline from already loaded artifacts
    pub fn new(config: ServerConfig, artifacts: Artifacts) -> Result<Self> {
        let Artifacts { classifier, labels, schema } = artifacts;

        let explainer = Explainer::from_classifier(&schema, &classifier);
        let engine = InferenceEngine::new(Arc::new(classifier), labels)?;
        let preprocessor = Preprocessor::with_config(schema, config.preprocessing.clone());
        let bands = BandMapper::default().with_fallback(config.fallback_band.clone());

        Ok(Self {
            config,
            preprocessor,
            engine,
            bands,
            explainer,
            started_at: chrono::Utc::now(),
        })
    }

    /// Load the artifacts named in the configuration and assemble the pipeline
    pub fn load(config: ServerConfig) -> Result<Self> {
        let artifacts = Artifacts::load(&config.artifacts)?;
        Self::new(config, artifacts)
    }

    /// Normalize, score, band and explain one applicant record
    pub fn predict(&self, payload: &Value) -> Result<PredictResponse> {
        let features = self.preprocessor.normalize(payload)?;
        let prediction = self.engine.predict(&features)?;
        let band = self.bands.to_band(&prediction.label).to_string();

        Ok(PredictResponse {
            predicted_class: prediction.label,
            probabilities: prediction.probabilities,
            band,
            explanation: self.explainer.explain(self.config.explain_top_k),
            features_used: features.columns().to_vec(),
        })
    }
}
