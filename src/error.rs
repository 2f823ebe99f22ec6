//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::classifier::ModelError;
use crate::features::RecordError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No model was loaded at startup
    #[error("Model is not loaded")]
    ModelNotLoaded,

    /// A record lacks a required field
    #[error("Column mismatch. Missing: {0}")]
    ColumnMismatch(String),

    /// Anything else that went wrong while parsing or predicting
    #[error("An error occurred during prediction: {0}")]
    PredictionFailed(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ModelNotLoaded => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ColumnMismatch(_) => StatusCode::BAD_REQUEST,
            AppError::PredictionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::ModelNotLoaded => tracing::error!("Prediction requested but no model is loaded"),
            AppError::ColumnMismatch(field) => tracing::warn!("Column mismatch, missing: {}", field),
            AppError::PredictionFailed(msg) => tracing::error!("Prediction error: {}", msg),
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::MissingField(field) => AppError::ColumnMismatch(field.to_string()),
            other => AppError::PredictionFailed(other.to_string()),
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::PredictionFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(AppError::ModelNotLoaded.to_string(), "Model is not loaded");
        assert_eq!(
            AppError::ColumnMismatch("voltage".into()).to_string(),
            "Column mismatch. Missing: voltage"
        );
        assert_eq!(
            AppError::PredictionFailed("boom".into()).to_string(),
            "An error occurred during prediction: boom"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::ModelNotLoaded.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::ColumnMismatch("id".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::PredictionFailed("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_record_error() {
        let missing: AppError = RecordError::MissingField("month_sin").into();
        assert!(matches!(missing, AppError::ColumnMismatch(ref f) if f == "month_sin"));

        let shape: AppError = RecordError::NotAnObject(3).into();
        assert!(matches!(shape, AppError::PredictionFailed(ref m) if m == "record 3 is not a JSON object"));
    }

    #[test]
    fn test_from_model_error() {
        let err: AppError = ModelError::BatchShape { expected: 2, got: 1 }.into();
        assert_eq!(
            err.to_string(),
            "An error occurred during prediction: model returned 1 outputs for 2 rows"
        );
    }
}
