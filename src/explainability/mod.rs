//! Model explainability
//!
//! Global feature importances from the classifier, ranked and formatted for
//! display. The same explanation is returned for every prediction; it says
//! which inputs matter to the model overall, not why one record scored as it did.

use crate::inference::Classifier;
use crate::preprocessing::FeatureSchema;
use ndarray::Array1;
use tracing::warn;

/// Ranked global feature importances
#[derive(Debug, Clone, Default)]
pub struct Explainer {
    ranked: Vec<(String, f64)>,
}

impl Explainer {
    /// Pair importances with schema columns by position
    pub fn new(schema: &FeatureSchema, importances: Option<Array1<f64>>) -> Self {
        let Some(importances) = importances else {
            return Self::default();
        };
        if importances.len() != schema.len() {
            warn!(
                n_importances = importances.len(),
                n_features = schema.len(),
                "Feature importances do not match the feature list, explanations disabled"
            );
            return Self::default();
        }

        let mut ranked: Vec<(String, f64)> = schema
            .columns()
            .iter()
            .cloned()
            .zip(importances.iter().copied())
            .collect();
        // Stable, so ties keep schema order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Self { ranked }
    }

    pub fn from_classifier(schema: &FeatureSchema, classifier: &dyn Classifier) -> Self {
        Self::new(schema, classifier.feature_importances())
    }

    /// Top `top_k` features with non-zero importance as `"name (importance X.XXX)"`
    pub fn explain(&self, top_k: usize) -> Vec<String> {
        self.ranked
            .iter()
            .take(top_k)
            .filter(|(_, weight)| *weight > 0.0)
            .map(|(name, weight)| format!("{} (importance {:.3})", name, weight))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec!["a".into(), "b".into(), "c".into(), "d".into()]).unwrap()
    }

    #[test]
    fn test_explain_ranks_and_formats() {
        let explainer = Explainer::new(&schema(), Some(array![0.1, 0.5, 0.0, 0.4]));
        assert_eq!(
            explainer.explain(5),
            vec!["b (importance 0.500)", "d (importance 0.400)", "a (importance 0.100)"]
        );
        assert_eq!(explainer.explain(1), vec!["b (importance 0.500)"]);
        assert!(explainer.explain(0).is_empty());
    }

    #[test]
    fn test_no_importances_gives_empty_explanation() {
        let explainer = Explainer::new(&schema(), None);
        assert!(explainer.explain(5).is_empty());
    }

    #[test]
    fn test_length_mismatch_gives_empty_explanation() {
        let explainer = Explainer::new(&schema(), Some(array![1.0, 0.0]));
        assert!(explainer.explain(5).is_empty());
    }

    #[test]
    fn test_explanation_is_identical_across_calls() {
        let explainer = Explainer::new(&schema(), Some(array![0.25, 0.25, 0.25, 0.25]));
        let first = explainer.explain(3);
        assert_eq!(first, explainer.explain(3));
        assert_eq!(first[0], "a (importance 0.250)");
    }
}
