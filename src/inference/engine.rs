//! Single-record inference

use super::{Classifier, LabelEncoder};
use crate::error::{Result, RiskError};
use crate::preprocessing::FeatureVector;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Decoded classifier output for one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub class_index: usize,
    pub probabilities: BTreeMap<String, f64>,
}

/// Classifier paired with the label decoder that names its classes
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    classifier: Arc<dyn Classifier>,
    labels: LabelEncoder,
}

impl InferenceEngine {
    pub fn new(classifier: Arc<dyn Classifier>, labels: LabelEncoder) -> Result<Self> {
        if classifier.n_classes() != labels.len() {
            return Err(RiskError::InvalidArtifact(format!(
                "classifier predicts {} classes but the label decoder knows {}",
                classifier.n_classes(),
                labels.len()
            )));
        }
        Ok(Self { classifier, labels })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }

    /// Score one schema-aligned row
    pub fn predict(&self, features: &FeatureVector<'_>) -> Result<Prediction> {
        let x = features.to_array();
        let proba = self.classifier.predict_proba(x.view())?;

        let n_classes = self.labels.len();
        if proba.dim() != (1, n_classes) {
            return Err(RiskError::ShapeError {
                expected: format!("[1, {}]", n_classes),
                actual: format!("{:?}", proba.shape()),
            });
        }
        let row = proba.row(0);

        // First maximum wins on ties
        let class_index = row
            .iter()
            .enumerate()
            .fold(0, |best, (i, &p)| if p > row[best] { i } else { best });

        let label = self.labels.inverse_transform(class_index)?.to_string();
        let probabilities = self
            .labels
            .classes()
            .iter()
            .cloned()
            .zip(row.iter().copied())
            .collect();

        Ok(Prediction {
            label,
            class_index,
            probabilities,
        })
    }
}
