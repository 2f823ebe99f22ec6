//! Classifier Module - the model behind `/predict`
//!
//! The service only needs two batch operations from a model: a binary label
//! and the probability of the positive class. Handlers see the model through
//! the `Classifier` trait, so tests can swap in a stub.

pub mod format;
pub mod xgboost;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::features::FeatureVector;

pub use xgboost::XgbClassifier;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported booster: {0}")]
    UnsupportedBooster(String),

    #[error("unsupported objective: {0}")]
    UnsupportedObjective(String),

    #[error("model expects {model} features, service provides {service}")]
    FeatureCount { model: i64, service: usize },

    #[error("feature layout mismatch: model has {model:?}, service provides {service:?}")]
    LayoutMismatch {
        model: Vec<String>,
        service: Vec<String>,
    },

    #[error("tree {0} has no nodes")]
    EmptyTree(usize),

    #[error("invalid node index in tree {tree}: node {node} references child {child} but tree has {num_nodes} nodes")]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },

    #[error("tree {tree} splits on feature {feature} which is outside the feature layout")]
    FeatureOutOfRange { tree: usize, feature: i32 },

    #[error("tree {tree} is malformed: {reason}")]
    MalformedTree { tree: usize, reason: String },

    #[error("weight_drop has {weights} entries for {trees} trees")]
    WeightDropMismatch { weights: usize, trees: usize },

    #[error("model returned {got} outputs for {expected} rows")]
    BatchShape { expected: usize, got: usize },

    #[error("model returned probability {value} for row {row}")]
    InvalidProbability { row: usize, value: f64 },
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Binary classifier over model feature rows.
///
/// Implementations are immutable once built and shared across request
/// tasks, hence `Send + Sync`.
pub trait Classifier: Send + Sync {
    /// Human readable model identifier (for logs and `/health`)
    fn name(&self) -> &str;

    /// Positive-class label per row
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<bool>, ModelError>;

    /// Probability of the positive class per row, in `[0, 1]`
    fn predict_proba(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError>;
}

/// Load the model file configured for this process
pub fn load_model(path: &Path) -> Result<Arc<dyn Classifier>, ModelError> {
    tracing::info!("Loading model from: {}", path.display());

    let model = XgbClassifier::from_file(path)?;

    tracing::info!(
        "Model {} loaded successfully ({} trees)",
        model.name(),
        model.num_trees()
    );

    Ok(Arc::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TINY_MODEL: &str = r#"{
        "learner": {
            "gradient_booster": {
                "name": "gbtree",
                "model": {
                    "trees": [{
                        "tree_param": {"num_nodes": "1", "num_feature": "13"},
                        "left_children": [-1],
                        "right_children": [-1],
                        "split_indices": [0],
                        "split_conditions": [0.25],
                        "default_left": [0]
                    }],
                    "tree_info": [0]
                }
            },
            "objective": {"name": "binary:logistic"},
            "learner_model_param": {"base_score": "5E-1", "num_class": "0", "num_feature": "13"}
        },
        "version": [2, 0, 3]
    }"#;

    #[test]
    fn test_load_model_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TINY_MODEL.as_bytes()).unwrap();

        let model = load_model(file.path()).unwrap();
        let proba = model.predict_proba(&[FeatureVector::new()]).unwrap();
        assert_eq!(proba.len(), 1);
        assert!((proba[0] - 0.5621765).abs() < 1e-6);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(&dir.path().join("missing.json")).err().unwrap();
        assert!(matches!(err, ModelError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_load_corrupt_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04\x95pickle-bytes").unwrap();

        let err = load_model(file.path()).err().unwrap();
        assert!(matches!(err, ModelError::Parse(_)));
    }
}
