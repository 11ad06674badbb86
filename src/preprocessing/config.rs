//! Preprocessing configuration

use serde::{Deserialize, Serialize};

/// Domain defaults applied while normalizing an applicant record.
///
/// The values mirror what the classifier saw at training time. They are policy,
/// so callers may override them, but the defaults should only change together
/// with a retrained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Education level assumed when the record carries none
    pub education_default: String,

    /// Marital status assumed when the record carries none
    pub marital_status_default: String,

    /// Product category assumed for the most recent credit enquiry
    pub last_product_default: String,

    /// Product category assumed for the first credit enquiry
    pub first_product_default: String,

    /// Education label to ordinal level
    pub education_levels: Vec<(String, i64)>,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            education_default: "GRADUATE".to_string(),
            marital_status_default: "Single".to_string(),
            last_product_default: "PL".to_string(),
            first_product_default: "PL".to_string(),
            education_levels: [
                ("SSC", 1),
                ("12TH", 2),
                ("GRADUATE", 3),
                ("UNDER GRADUATE", 3),
                ("POST-GRADUATE", 4),
                ("OTHERS", 1),
                ("PROFESSIONAL", 3),
            ]
            .iter()
            .map(|(label, level)| (label.to_string(), *level))
            .collect(),
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the default education level
    pub fn with_education_default(mut self, education: impl Into<String>) -> Self {
        self.education_default = education.into();
        self
    }

    /// Builder method to set the default marital status
    pub fn with_marital_status_default(mut self, status: impl Into<String>) -> Self {
        self.marital_status_default = status.into();
        self
    }

    /// Builder method to set both enquiry product defaults
    pub fn with_product_defaults(mut self, last: impl Into<String>, first: impl Into<String>) -> Self {
        self.last_product_default = last.into();
        self.first_product_default = first.into();
        self
    }

    /// Ordinal level for an education label, if the label is known
    pub fn education_level(&self, label: &str) -> Option<i64> {
        self.education_levels
            .iter()
            .find(|(known, _)| known == label)
            .map(|(_, level)| *level)
    }
}
