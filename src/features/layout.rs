//! Feature Layout - request field names vs. model feature names
//!
//! The model was trained on columns whose names do not follow the request
//! naming convention (`power_factor` vs. `Power Factor`). This table is the
//! single source of truth for both the rename and the column order the
//! model expects.
//!
//! Changing the order here changes what the model sees in each column.
//! Keep it identical to the training pipeline's feature list.

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Name of the record identifier field (not a feature).
pub const ID_FIELD: &str = "id";

/// One entry of the rename table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureMapping {
    /// Field name as sent by clients (lower_snake_case)
    pub external: &'static str,
    /// Column name the model was trained with
    pub model: &'static str,
}

const fn mapping(external: &'static str, model: &'static str) -> FeatureMapping {
    FeatureMapping { external, model }
}

/// Rename table in model column order.
pub const FEATURE_MAPPING: [FeatureMapping; FEATURE_COUNT] = [
    // === Meter readings (0-3) ===
    mapping("consumption", "Consumption"),
    mapping("voltage", "Voltage"),
    mapping("current", "Current"),
    mapping("power_factor", "Power Factor"),

    // === Billing (4-5) ===
    mapping("bill_to_usage_ratio", "Bill_to_usage_ratio"),
    mapping("delta_units", "delta_units"),

    // === Rolling window statistics (6-9) ===
    mapping("rolling_avg", "rolling_avg"),
    mapping("rolling_min", "rolling_min"),
    mapping("rolling_max", "rolling_max"),
    mapping("rolling_std", "rolling_std"),

    // === Derived (10-12) ===
    mapping("interaction_billing_pf", "interaction_billing_pf"),
    mapping("month_sin", "month_sin"),
    mapping("month_cos", "month_cos"),
];

/// Total number of model features
pub const FEATURE_COUNT: usize = 13;

// ============================================================================
// LOOKUPS
// ============================================================================

/// Model feature names, in column order
pub fn model_feature_names() -> impl Iterator<Item = &'static str> {
    FEATURE_MAPPING.iter().map(|m| m.model)
}

/// Check that a model's own feature list matches this layout exactly
pub fn matches_model_features<S: AsRef<str>>(names: &[S]) -> bool {
    names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(model_feature_names())
            .all(|(got, expected)| got.as_ref() == expected)
}

// ============================================================================
// TESTS
// ============================================================================
