//! Electricity theft detection - prediction service
//!
//! Serves a pre-trained XGBoost classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   PREDICTION SERVICE                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  POST /predict                                           │
//! │    JSON records ──► features (rename + coerce)           │
//! │                         │                                │
//! │                         ▼                                │
//! │                  ┌─────────────┐                         │
//! │                  │ Classifier  │  loaded once at startup │
//! │                  │ (XGBoost)   │  shared read-only       │
//! │                  └──────┬──────┘                         │
//! │                         ▼                                │
//! │    [{id, is_anomaly, confidence}] ◄──                    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod classifier;
pub mod features;
pub mod models;
pub mod handlers;
mod error;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};

use classifier::Classifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// `None` when the model failed to load; the service then runs degraded
    pub model: Option<Arc<dyn Classifier>>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn Classifier>>, config: config::Config) -> Self {
        Self { model, config }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
