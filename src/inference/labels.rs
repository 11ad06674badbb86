//! Label decoder mapping class indices back to their original labels

use super::artifacts::read_json;
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Accepted on-disk layouts: a bare `classes_` array or `{"classes": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelFile {
    Classes(Vec<String>),
    Object { classes: Vec<String> },
}

/// Ordered class labels; index `i` is the label the classifier calls class `i`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(RiskError::InvalidArtifact("label list is empty".to_string()));
        }
        let mut seen = HashSet::with_capacity(classes.len());
        if let Some(dup) = classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(RiskError::InvalidArtifact(format!("duplicate class label '{}'", dup)));
        }
        Ok(Self { classes })
    }

    /// Load the label artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let classes = match read_json::<LabelFile>(path.as_ref())? {
            LabelFile::Classes(classes) | LabelFile::Object { classes } => classes,
        };
        Self::new(classes)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Label for a class index
    pub fn inverse_transform(&self, index: usize) -> Result<&str> {
        self.classes.get(index).map(String::as_str).ok_or_else(|| {
            RiskError::InferenceError(format!(
                "class index {} out of range for {} known labels",
                index,
                self.classes.len()
            ))
        })
    }
}
