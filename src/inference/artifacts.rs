//! Model artifact loading
//!
//! The classifier, label decoder and feature list are produced by the training
//! job and loaded once at startup. Any missing, corrupt or mutually
//! inconsistent artifact is an error; there is no degraded mode.

use super::{Booster, Classifier, LabelEncoder};
use crate::error::{Result, RiskError};
use crate::preprocessing::FeatureSchema;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MODEL_FILE: &str = "xgb_classifier.json";
pub const ENCODER_FILE: &str = "label_encoder.json";
pub const FEATURES_FILE: &str = "feature_columns.json";

/// Filesystem locations of the three artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoder: PathBuf,
    pub features: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        let defaults = Self::in_dir(default_models_dir());
        Self {
            model: env_path("MODEL_PATH").unwrap_or(defaults.model),
            encoder: env_path("ENCODER_PATH").unwrap_or(defaults.encoder),
            features: env_path("FEATURES_PATH").unwrap_or(defaults.features),
        }
    }
}

impl ArtifactPaths {
    /// Standard file names inside one directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            encoder: dir.join(ENCODER_FILE),
            features: dir.join(FEATURES_FILE),
        }
    }
}

/// `models/` next to the crate manifest
pub fn default_models_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("models")
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Everything the service needs from the training job
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub classifier: Booster,
    pub labels: LabelEncoder,
    pub schema: FeatureSchema,
}

impl Artifacts {
    /// Load and cross-check all artifacts
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let schema = load_feature_schema(&paths.features)?;
        let labels = LabelEncoder::load(&paths.encoder)?;
        let classifier = Booster::load(&paths.model)?;

        let artifacts = Self { classifier, labels, schema };
        artifacts.validate()?;

        info!(
            model = %paths.model.display(),
            encoder = %paths.encoder.display(),
            features = %paths.features.display(),
            n_features = artifacts.schema.len(),
            n_trees = artifacts.classifier.n_trees(),
            objective = %artifacts.classifier.objective_name(),
            classes = ?artifacts.labels.classes(),
            "Model artifacts loaded"
        );
        Ok(artifacts)
    }

    /// Check that the three artifacts describe the same model
    pub fn validate(&self) -> Result<()> {
        if self.classifier.n_features() != self.schema.len() {
            return Err(RiskError::InvalidArtifact(format!(
                "classifier expects {} features but the feature list has {}",
                self.classifier.n_features(),
                self.schema.len()
            )));
        }
        if self.classifier.n_classes() != self.labels.len() {
            return Err(RiskError::InvalidArtifact(format!(
                "classifier predicts {} classes but the label decoder knows {}",
                self.classifier.n_classes(),
                self.labels.len()
            )));
        }
        let names = self.classifier.feature_names();
        if !names.is_empty() && names != self.schema.columns() {
            return Err(RiskError::InvalidArtifact(
                "feature names stored in the classifier differ from the feature list".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load the ordered feature-name list
pub fn load_feature_schema(path: impl AsRef<Path>) -> Result<FeatureSchema> {
    let columns: Vec<String> = read_json(path.as_ref())?;
    FeatureSchema::new(columns)
}

/// Read and parse a JSON artifact, naming the file in any error
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| RiskError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RiskError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })
}
