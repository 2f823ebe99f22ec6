//! XGBoost tree ensemble - binary classifier over the 13 model features
//!
//! Loaded from XGBoost's native JSON model format and converted into a flat
//! node array per tree. Prediction follows XGBoost's predictor:
//!
//! ```text
//! margin = logit(base_score) + Σ weight_t · leaf_t(x)
//! proba  = sigmoid(margin)
//! label  = proba > 0.5
//! ```
//!
//! Split rule: `x < threshold` goes left, NaN follows the default branch.

use std::path::Path;

use super::format::{GradientBooster, ModelTrees, Tree, XgbModel};
use super::{Classifier, ModelError};
use crate::features::{layout, FeatureVector, FEATURE_COUNT};

/// Probability above which a row is labelled positive
pub const DECISION_THRESHOLD: f64 = 0.5;

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        default_left: bool,
        left: usize,
        right: usize,
    },
    Leaf(f32),
}

#[derive(Debug, Clone)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Walk from the root to a leaf.
    ///
    /// Children always sit after their parent (checked at load), so the walk
    /// terminates.
    fn leaf_value(&self, row: &[f32]) -> f32 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    default_left,
                    left,
                    right,
                } => {
                    let value = row[feature];
                    let go_left = if value.is_nan() {
                        default_left
                    } else {
                        value < threshold
                    };
                    idx = if go_left { left } else { right };
                }
            }
        }
    }
}

fn convert_tree(xgb_tree: &Tree, tree_idx: usize) -> Result<RegressionTree, ModelError> {
    let num_nodes = usize::try_from(xgb_tree.tree_param.num_nodes).unwrap_or(0);
    if num_nodes == 0 {
        return Err(ModelError::EmptyTree(tree_idx));
    }

    let arrays = [
        ("left_children", xgb_tree.left_children.len()),
        ("right_children", xgb_tree.right_children.len()),
        ("split_indices", xgb_tree.split_indices.len()),
        ("split_conditions", xgb_tree.split_conditions.len()),
        ("default_left", xgb_tree.default_left.len()),
    ];
    if let Some((name, len)) = arrays.iter().find(|(_, len)| *len < num_nodes) {
        return Err(ModelError::MalformedTree {
            tree: tree_idx,
            reason: format!("{name} has {len} entries for {num_nodes} nodes"),
        });
    }

    let check_child = |node: usize, child: i32| -> Result<usize, ModelError> {
        match usize::try_from(child) {
            Ok(c) if c > node && c < num_nodes => Ok(c),
            _ => Err(ModelError::InvalidNodeIndex {
                tree: tree_idx,
                node,
                child,
                num_nodes,
            }),
        }
    };

    let mut nodes = Vec::with_capacity(num_nodes);
    for node_idx in 0..num_nodes {
        let left_child = xgb_tree.left_children[node_idx];

        // XGBoost marks leaves with left child -1; the leaf value lives in split_conditions
        if left_child == -1 {
            nodes.push(Node::Leaf(xgb_tree.split_conditions[node_idx]));
            continue;
        }

        if xgb_tree.split_type.get(node_idx).copied().unwrap_or(0) != 0 {
            return Err(ModelError::MalformedTree {
                tree: tree_idx,
                reason: format!("node {node_idx} is a categorical split"),
            });
        }

        let left = check_child(node_idx, left_child)?;
        let right = check_child(node_idx, xgb_tree.right_children[node_idx])?;

        let raw_feature = xgb_tree.split_indices[node_idx];
        let feature = usize::try_from(raw_feature)
            .ok()
            .filter(|f| *f < FEATURE_COUNT)
            .ok_or(ModelError::FeatureOutOfRange {
                tree: tree_idx,
                feature: raw_feature,
            })?;

        nodes.push(Node::Split {
            feature,
            threshold: xgb_tree.split_conditions[node_idx],
            default_left: xgb_tree.default_left[node_idx] != 0,
            left,
            right,
        });
    }

    Ok(RegressionTree { nodes })
}

// ============================================================================
// OBJECTIVE
// ============================================================================

/// How the margin maps to a probability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    /// `binary:logistic`, `reg:logistic`: base_score stored as a probability
    Logistic,
    /// `binary:logitraw`: base_score stored as a margin
    LogitRaw,
}

impl Link {
    fn from_objective(name: &str) -> Result<Self, ModelError> {
        match name {
            "binary:logistic" | "reg:logistic" => Ok(Link::Logistic),
            "binary:logitraw" => Ok(Link::LogitRaw),
            other => Err(ModelError::UnsupportedObjective(other.to_string())),
        }
    }

    /// Convert base_score from probability space to margin space
    fn base_margin(self, base_score: f32) -> f32 {
        match self {
            Link::Logistic => {
                let p = base_score.clamp(1e-7, 1.0 - 1e-7);
                (p / (1.0 - p)).ln()
            }
            Link::LogitRaw => base_score,
        }
    }
}

fn sigmoid(margin: f32) -> f64 {
    1.0 / (1.0 + (-(margin as f64)).exp())
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Gradient boosted tree ensemble for binary classification
#[derive(Debug, Clone)]
pub struct XgbClassifier {
    name: String,
    trees: Vec<RegressionTree>,
    /// Per-tree output scale (dart `weight_drop`, 1.0 for gbtree)
    tree_weights: Vec<f32>,
    base_margin: f32,
}

impl XgbClassifier {
    /// Load a model saved with `Booster.save_model("*.json")`
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let model: XgbModel = serde_json::from_slice(&bytes)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_model(name, &model)
    }

    /// Validate and convert a parsed model
    pub fn from_model(name: impl Into<String>, model: &XgbModel) -> Result<Self, ModelError> {
        let learner = &model.learner;

        let link = Link::from_objective(&learner.objective.name)?;

        if learner.learner_model_param.num_class > 1 {
            return Err(ModelError::UnsupportedObjective(format!(
                "{} with {} classes",
                learner.objective.name, learner.learner_model_param.num_class
            )));
        }

        let num_feature = learner.learner_model_param.num_feature;
        if num_feature < 0 || num_feature as usize > FEATURE_COUNT {
            return Err(ModelError::FeatureCount {
                model: num_feature,
                service: FEATURE_COUNT,
            });
        }

        if !learner.feature_names.is_empty()
            && !layout::matches_model_features(&learner.feature_names)
        {
            return Err(ModelError::LayoutMismatch {
                model: learner.feature_names.clone(),
                service: layout::model_feature_names().map(String::from).collect(),
            });
        }

        let (model_trees, weight_drop): (&ModelTrees, Option<&Vec<f32>>) =
            match &learner.gradient_booster {
                GradientBooster::Gbtree { model } => (model, None),
                GradientBooster::Dart {
                    gbtree,
                    weight_drop,
                } => (&gbtree.model, Some(weight_drop)),
                other => return Err(ModelError::UnsupportedBooster(other.name().to_string())),
            };

        if let Some(weights) = weight_drop {
            if weights.len() != model_trees.trees.len() {
                return Err(ModelError::WeightDropMismatch {
                    weights: weights.len(),
                    trees: model_trees.trees.len(),
                });
            }
        }

        let trees = model_trees
            .trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| convert_tree(tree, idx))
            .collect::<Result<Vec<_>, _>>()?;

        let tree_weights = match weight_drop {
            Some(weights) => weights.clone(),
            None => vec![1.0; trees.len()],
        };

        Ok(Self {
            name: name.into(),
            trees,
            tree_weights,
            base_margin: link.base_margin(learner.learner_model_param.base_score),
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw ensemble output for one row
    pub fn margin(&self, row: &FeatureVector) -> f32 {
        self.trees
            .iter()
            .zip(&self.tree_weights)
            .fold(self.base_margin, |acc, (tree, weight)| {
                acc + weight * tree.leaf_value(row.as_slice())
            })
    }
}

impl Classifier for XgbClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<bool>, ModelError> {
        Ok(self
            .predict_proba(rows)?
            .into_iter()
            .map(|p| p > DECISION_THRESHOLD)
            .collect())
    }

    fn predict_proba(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        Ok(rows.iter().map(|row| sigmoid(self.margin(row))).collect())
    }
}
