//! Prediction handler

use axum::{
    body::{to_bytes, Body},
    extract::State,
    Json,
};

use crate::{AppState, AppError, AppResult};
use crate::classifier::ModelError;
use crate::features::RecordBatch;
use crate::models::PredictionResult;

/// Classify a batch of meter records.
///
/// The body is only read after the model check, so a missing model wins over
/// any body problem. Read failures (including bodies over `max_body_bytes`)
/// and malformed JSON are prediction errors in the usual JSON shape.
pub async fn predict(
    State(state): State<AppState>,
    body: Body,
) -> AppResult<Json<Vec<PredictionResult>>> {
    let model = state.model.as_deref().ok_or(AppError::ModelNotLoaded)?;

    let body = to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|e| AppError::PredictionFailed(format!("failed to read request body: {e}")))?;

    let batch = RecordBatch::from_json(&body)?;

    if batch.coerced > 0 {
        tracing::debug!(
            "Zero-filled {} non-numeric feature values across {} records",
            batch.coerced,
            batch.len()
        );
    }

    let labels = model.predict(&batch.rows)?;
    let probabilities = model.predict_proba(&batch.rows)?;

    for got in [labels.len(), probabilities.len()] {
        if got != batch.len() {
            return Err(ModelError::BatchShape { expected: batch.len(), got }.into());
        }
    }

    let results = batch
        .ids
        .iter()
        .zip(labels)
        .zip(probabilities)
        .enumerate()
        .map(|(row, ((&id, is_anomaly), confidence))| {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ModelError::InvalidProbability { row, value: confidence });
            }
            Ok(PredictionResult { id, is_anomaly, confidence })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        "Predicted {} records ({} flagged)",
        results.len(),
        results.iter().filter(|r| r.is_anomaly).count()
    );

    Ok(Json(results))
}
