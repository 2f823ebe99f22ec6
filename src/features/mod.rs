//! Features - request records to model input rows
//!
//! Rename table, numeric coercion and batch parsing.

pub mod layout;
pub mod record;
pub mod vector;

pub use layout::{FeatureMapping, FEATURE_COUNT, FEATURE_MAPPING, ID_FIELD};
pub use record::{RecordBatch, RecordError};
pub use vector::{coerce_numeric, FeatureVector};
