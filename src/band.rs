//! Risk band mapping from predicted class labels

use serde::{Deserialize, Serialize};

pub const DEFAULT_FALLBACK_BAND: &str = "high";

/// Ordered class-label to band table with a fallback for unknown labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandMapper {
    bands: Vec<(String, String)>,
    fallback: String,
}

impl Default for BandMapper {
    fn default() -> Self {
        Self::new(
            [("P1", "low"), ("P2", "medium"), ("P3", "high"), ("P4", "very-high")]
                .iter()
                .map(|(label, band)| (label.to_string(), band.to_string()))
                .collect(),
            DEFAULT_FALLBACK_BAND,
        )
    }
}

impl BandMapper {
    pub fn new(bands: Vec<(String, String)>, fallback: impl Into<String>) -> Self {
        Self {
            bands,
            fallback: fallback.into(),
        }
    }

    /// Builder method to set the band used for unrecognized labels
    pub fn with_fallback(mut self, band: impl Into<String>) -> Self {
        self.fallback = band.into();
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn bands(&self) -> &[(String, String)] {
        &self.bands
    }

    pub fn to_band(&self, label: &str) -> &str {
        self.bands
            .iter()
            .find(|(known, _)| known == label)
            .map(|(_, band)| band.as_str())
            .unwrap_or(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands() {
        let mapper = BandMapper::default();
        assert_eq!(mapper.to_band("P1"), "low");
        assert_eq!(mapper.to_band("P2"), "medium");
        assert_eq!(mapper.to_band("P3"), "high");
        assert_eq!(mapper.to_band("P4"), "very-high");
    }

    #[test]
    fn test_unknown_label_falls_back() {
        let mapper = BandMapper::default();
        assert_eq!(mapper.to_band("UNKNOWN"), "high");
        assert_eq!(mapper.to_band("p1"), "high");
        assert_eq!(mapper.to_band(""), "high");
    }

    #[test]
    fn test_band_table_keeps_class_order() {
        let mapper = BandMapper::default();
        let labels: Vec<&str> = mapper.bands().iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, ["P1", "P2", "P3", "P4"]);
    }

    #[test]
    fn test_configurable_fallback() {
        let mapper = BandMapper::default().with_fallback("review");
        assert_eq!(mapper.to_band("P9"), "review");
        assert_eq!(mapper.to_band("P1"), "low");
    }
}
