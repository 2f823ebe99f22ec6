//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    model: Option<String>,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.model.as_deref().map(|m| m.name().to_string());

    Json(HealthResponse {
        status: if model.is_some() { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: model.is_some(),
        model,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
