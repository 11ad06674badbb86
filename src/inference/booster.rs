//! XGBoost tree ensemble loaded from the native JSON model format
//!
//! Reads what `Booster.save_model("model.json")` writes and evaluates it the
//! way XGBoost does:
//! - Split thresholds compared in `f32`, `x < threshold` goes left
//! - Missing values (NaN) follow the node's default direction
//! - Leaf values summed per output group (`tree_info`), plus the base margin
//! - Softmax for `multi:*` objectives, sigmoid for `binary:*`

use super::artifacts::read_json;
use super::Classifier;
use crate::error::{Result, RiskError};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Deserializer};
use std::path::Path;

// ============================================================================
// JSON model layout
// ============================================================================

#[derive(Debug, Deserialize)]
struct ModelFile {
    learner: LearnerJson,
}

#[derive(Debug, Deserialize)]
struct LearnerJson {
    gradient_booster: GradientBoosterJson,
    learner_model_param: LearnerModelParamJson,
    objective: ObjectiveJson,
    #[serde(default)]
    feature_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GradientBoosterJson {
    name: String,
    #[serde(default)]
    model: Option<GbTreeModelJson>,
}

#[derive(Debug, Deserialize)]
struct GbTreeModelJson {
    trees: Vec<TreeJson>,
    tree_info: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct TreeJson {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    default_left: Vec<bool>,
    #[serde(default)]
    loss_changes: Vec<f32>,
    #[serde(default)]
    split_type: Vec<u8>,
}

/// XGBoost stores model parameters as strings
#[derive(Debug, Deserialize)]
struct LearnerModelParamJson {
    base_score: String,
    num_class: String,
    num_feature: String,
}

#[derive(Debug, Deserialize)]
struct ObjectiveJson {
    name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

/// `default_left` is written as 0/1 integers by some versions and booleans by others
fn deserialize_flags<'de, D>(deserializer: D) -> std::result::Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flags = Vec::<Flag>::deserialize(deserializer)?;
    Ok(flags
        .into_iter()
        .map(|flag| match flag {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
        .collect())
}

// ============================================================================
// Runtime model
// ============================================================================

/// Output transformation of the summed margins
#[derive(Debug, Clone, Copy, PartialEq)]
enum Objective {
    /// `multi:softprob` / `multi:softmax`
    Softmax,
    /// `binary:logistic` / `binary:logitraw`, both with a probability-valued base score
    Logistic,
}

impl Objective {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "multi:softprob" | "multi:softmax" => Ok(Objective::Softmax),
            "binary:logistic" | "binary:logitraw" => Ok(Objective::Logistic),
            other => Err(RiskError::UnsupportedModel(format!(
                "objective '{}' is not a classification objective",
                other
            ))),
        }
    }
}

/// A single regression tree in XGBoost's flat array layout
#[derive(Debug, Clone)]
struct RegTree {
    left: Vec<i32>,
    right: Vec<i32>,
    feature: Vec<u32>,
    /// Split threshold for internal nodes, leaf value for leaves
    value: Vec<f32>,
    default_left: Vec<bool>,
    gain: Vec<f32>,
}

impl RegTree {
    fn from_json(index: usize, tree: TreeJson, n_features: usize) -> Result<Self> {
        let n_nodes = tree.left_children.len();
        let invalid = |reason: String| {
            RiskError::InvalidArtifact(format!("classifier tree {}: {}", index, reason))
        };

        if n_nodes == 0 {
            return Err(invalid("tree has no nodes".to_string()));
        }
        let lengths = [
            tree.right_children.len(),
            tree.split_indices.len(),
            tree.split_conditions.len(),
            tree.default_left.len(),
        ];
        if lengths.iter().any(|&len| len != n_nodes) {
            return Err(invalid(format!(
                "node arrays disagree in length ({} nodes, got {:?})",
                n_nodes, lengths
            )));
        }
        if let Some(nid) = tree.split_type.iter().position(|&t| t != 0) {
            return Err(RiskError::UnsupportedModel(format!(
                "classifier tree {}: node {} uses a categorical split",
                index, nid
            )));
        }

        for nid in 0..n_nodes {
            let (left, right) = (tree.left_children[nid], tree.right_children[nid]);
            if left == -1 {
                continue;
            }
            // Children always follow their parent, which also rules out cycles
            for child in [left, right] {
                if child <= nid as i32 || child as usize >= n_nodes {
                    return Err(invalid(format!("node {} has invalid child {}", nid, child)));
                }
            }
            let feature = tree.split_indices[nid] as usize;
            if feature >= n_features {
                return Err(invalid(format!(
                    "node {} splits on feature {} but the model has {} features",
                    nid, feature, n_features
                )));
            }
        }

        let mut gain = tree.loss_changes;
        gain.resize(n_nodes, 0.0);

        Ok(Self {
            left: tree.left_children,
            right: tree.right_children,
            feature: tree.split_indices,
            value: tree.split_conditions,
            default_left: tree.default_left,
            gain,
        })
    }

    fn is_leaf(&self, nid: usize) -> bool {
        self.left[nid] == -1
    }

    fn leaf_value(&self, row: ArrayView1<'_, f64>) -> f32 {
        let mut nid = 0;
        while !self.is_leaf(nid) {
            let fvalue = row[self.feature[nid] as usize];
            let go_left = if fvalue.is_nan() {
                self.default_left[nid]
            } else {
                (fvalue as f32) < self.value[nid]
            };
            let next = if go_left { self.left[nid] } else { self.right[nid] };
            nid = next as usize;
        }
        self.value[nid]
    }

    /// (feature, gain) for every split node
    fn splits(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        (0..self.left.len())
            .filter(|&nid| !self.is_leaf(nid))
            .map(|nid| (self.feature[nid] as usize, self.gain[nid]))
    }
}

/// Gradient boosted tree classifier
#[derive(Debug, Clone)]
pub struct Booster {
    trees: Vec<RegTree>,
    tree_groups: Vec<usize>,
    base_margin: Vec<f64>,
    objective: Objective,
    objective_name: String,
    n_features: usize,
    n_classes: usize,
    feature_names: Vec<String>,
}

impl Booster {
    /// Load a model written by `Booster.save_model("*.json")`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file: ModelFile = read_json(path.as_ref())?;
        Self::from_model(file)
    }

    /// Parse a model from its JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)
            .map_err(|e| RiskError::InvalidArtifact(format!("classifier: {}", e)))?;
        Self::from_model(file)
    }

    fn from_model(file: ModelFile) -> Result<Self> {
        let learner = file.learner;
        let objective = Objective::parse(&learner.objective.name)?;

        if learner.gradient_booster.name != "gbtree" {
            return Err(RiskError::UnsupportedModel(format!(
                "booster '{}' is not supported, expected 'gbtree'",
                learner.gradient_booster.name
            )));
        }
        let model = learner.gradient_booster.model.ok_or_else(|| {
            RiskError::InvalidArtifact("classifier has no tree model".to_string())
        })?;

        let params = &learner.learner_model_param;
        let n_features = parse_param("num_feature", &params.num_feature)?;
        let num_class = parse_param("num_class", &params.num_class)?;

        let (n_groups, n_classes) = match objective {
            Objective::Softmax if num_class >= 2 => (num_class, num_class),
            Objective::Softmax => {
                return Err(RiskError::InvalidArtifact(format!(
                    "multi-class objective with num_class = {}",
                    num_class
                )))
            }
            Objective::Logistic => (1, 2),
        };

        if model.tree_info.len() != model.trees.len() {
            return Err(RiskError::InvalidArtifact(format!(
                "tree_info has {} entries for {} trees",
                model.tree_info.len(),
                model.trees.len()
            )));
        }
        if let Some(group) = model.tree_info.iter().find(|&&g| g >= n_groups) {
            return Err(RiskError::InvalidArtifact(format!(
                "tree assigned to output group {} but the model has {}",
                group, n_groups
            )));
        }

        let trees = model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| RegTree::from_json(i, tree, n_features))
            .collect::<Result<Vec<_>>>()?;

        let base_margin = base_margin(&params.base_score, n_groups, objective)?;

        Ok(Self {
            trees,
            tree_groups: model.tree_info,
            base_margin,
            objective,
            objective_name: learner.objective.name,
            n_features,
            n_classes,
            feature_names: learner.feature_names,
        })
    }

    pub fn objective_name(&self) -> &str {
        &self.objective_name
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Feature names recorded in the model, empty when trained without them
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Raw per-group margins for one row
    fn margins(&self, row: ArrayView1<'_, f64>) -> Vec<f64> {
        let mut margins = self.base_margin.clone();
        for (tree, &group) in self.trees.iter().zip(&self.tree_groups) {
            margins[group] += tree.leaf_value(row) as f64;
        }
        margins
    }
}

impl Classifier for Booster {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(RiskError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut proba = Array2::zeros((x.nrows(), self.n_classes));
        for (row, mut out) in x.rows().into_iter().zip(proba.rows_mut()) {
            let margins = self.margins(row);
            match self.objective {
                Objective::Softmax => {
                    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    let exp: Vec<f64> = margins.iter().map(|m| (m - max).exp()).collect();
                    let total: f64 = exp.iter().sum();
                    for (o, e) in out.iter_mut().zip(&exp) {
                        *o = e / total;
                    }
                }
                Objective::Logistic => {
                    let p = sigmoid(margins[0]);
                    out[0] = 1.0 - p;
                    out[1] = p;
                }
            }
        }
        Ok(proba)
    }

    /// Average split gain per feature, normalized to sum to one
    fn feature_importances(&self) -> Option<Array1<f64>> {
        let mut total_gain = vec![0.0_f64; self.n_features];
        let mut split_count = vec![0_usize; self.n_features];
        for tree in &self.trees {
            for (feature, gain) in tree.splits() {
                total_gain[feature] += gain as f64;
                split_count[feature] += 1;
            }
        }

        let mut importances: Array1<f64> = total_gain
            .iter()
            .zip(&split_count)
            .map(|(&g, &n)| if n > 0 { g / n as f64 } else { 0.0 })
            .collect();
        let sum = importances.sum();
        if sum > 0.0 {
            importances /= sum;
        }
        Some(importances)
    }
}

fn parse_param(name: &str, raw: &str) -> Result<usize> {
    raw.trim().parse().map_err(|_| {
        RiskError::InvalidArtifact(format!("learner parameter {} = '{}' is not an integer", name, raw))
    })
}

/// Parse `base_score`, scalar (`"5E-1"`) or vector (`"[5E-1,5E-1]"`), into margin space
fn base_margin(raw: &str, n_groups: usize, objective: Objective) -> Result<Vec<f64>> {
    let invalid = || RiskError::InvalidArtifact(format!("base_score '{}' is not valid", raw));

    let scores = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| s.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>>>()?;

    let scores = match scores.len() {
        1 => vec![scores[0]; n_groups],
        n if n == n_groups => scores,
        _ => return Err(invalid()),
    };

    match objective {
        Objective::Logistic => scores
            .into_iter()
            .map(|p| {
                if p > 0.0 && p < 1.0 {
                    Ok((p / (1.0 - p)).ln())
                } else {
                    Err(invalid())
                }
            })
            .collect(),
        _ => Ok(scores),
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
