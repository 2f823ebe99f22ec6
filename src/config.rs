//! Configuration module

use std::env;
use std::path::PathBuf;

/// Default model artifact, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "electricity_theft_detector_xgb.json";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// XGBoost JSON model file
    pub model_path: PathBuf,

    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Largest accepted request body
    pub max_body_bytes: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            host: "0.0.0.0".to_string(),
            port: 5001,
            max_body_bytes: 2 * 1024 * 1024,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing or unparsable values keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            host: lookup("HOST").unwrap_or(defaults.host),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            max_body_bytes: lookup("MAX_BODY_BYTES")
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_body_bytes),

            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
