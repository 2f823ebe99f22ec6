//! Prediction model

use serde::{Deserialize, Serialize};

/// One result per input record, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub id: i64,
    pub is_anomaly: bool,
    /// Probability of the positive (theft) class
    pub confidence: f64,
}
