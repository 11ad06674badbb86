//! Credit Risk Model Service
//!
//! Loads a pre-trained credit risk classifier and scores loosely structured
//! applicant records over HTTP.
//!
//! # Modules
//!
//! - [`preprocessing`] - Record normalization and alignment to the trained schema
//! - [`inference`] - Artifact loading, XGBoost tree ensembles, label decoding
//! - [`band`] - Risk band mapping from predicted labels
//! - [`explainability`] - Global feature-importance explanations
//! - [`server`] - HTTP server with the health and predict endpoints
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Scoring pipeline
pub mod preprocessing;
pub mod inference;
pub mod band;
pub mod explainability;

// Services
pub mod server;
pub mod cli;

pub use error::{Result, RiskError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, RiskError};
    pub use crate::preprocessing::{FeatureSchema, FeatureVector, PreprocessingConfig, Preprocessor};
    pub use crate::inference::{ArtifactPaths, Artifacts, Booster, Classifier, InferenceEngine, LabelEncoder, Prediction};
    pub use crate::band::BandMapper;
    pub use crate::explainability::Explainer;
    pub use crate::server::{AppState, ServerConfig};
}
