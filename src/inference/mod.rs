//! Inference module
//!
//! Provides model inference for the scoring service:
//! - Artifact loading and cross-validation (classifier, label decoder, feature list)
//! - XGBoost JSON tree ensembles with missing-value routing
//! - Classification probabilities and label decoding
//! - Gain-based global feature importances

mod artifacts;
mod booster;
mod engine;
mod labels;

pub use artifacts::{
    default_models_dir, load_feature_schema, ArtifactPaths, Artifacts, ENCODER_FILE,
    FEATURES_FILE, MODEL_FILE,
};
pub use booster::Booster;
pub use engine::{InferenceEngine, Prediction};
pub use labels::LabelEncoder;

use crate::error::Result;
use ndarray::{Array1, Array2, ArrayView2};

/// Probabilistic classifier over a fixed-width numeric feature matrix
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Number of input columns
    fn n_features(&self) -> usize;

    /// Number of classes, i.e. output columns of [`Classifier::predict_proba`]
    fn n_classes(&self) -> usize;

    /// Class probabilities, one row per input row. NaN inputs are missing values.
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>>;

    /// Global per-feature importances aligned with the input columns, if the
    /// model exposes any
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}
