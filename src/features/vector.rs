//! Feature Vector - one model input row
//!
//! **Zero-fill coercion.** Any feature value that cannot be read as a number
//! becomes `0.0`, the same fill the training data went through. This keeps
//! the model's input distribution aligned with training, but it also means a
//! broken upstream reading (`""`, `"N/A"`, `null`) is indistinguishable from
//! a real zero.
//! Callers get the number of coerced cells back so it can at least be logged.

use serde_json::{Map, Value};

use super::layout::{FEATURE_COUNT, FEATURE_MAPPING};

/// Model input row, values in `FEATURE_MAPPING` order.
///
/// Stored as `f32`: tree split thresholds are single precision, so comparing
/// in `f32` reproduces the training library's routing exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Zeroed feature vector
    pub fn new() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }

    /// Build a row from a request object.
    ///
    /// Returns the vector and how many values were zero-filled, or the
    /// model column name of the first feature the record lacks (the column
    /// that is missing after the rename). Fields not in the layout are
    /// ignored.
    pub fn from_record(record: &Map<String, Value>) -> Result<(Self, usize), &'static str> {
        let mut vector = Self::new();
        let mut coerced = 0;

        for (slot, mapping) in vector.values.iter_mut().zip(FEATURE_MAPPING.iter()) {
            let raw = record.get(mapping.external).ok_or(mapping.model)?;
            match coerce_numeric(raw) {
                Some(v) => *slot = v as f32,
                None => coerced += 1,
            }
        }

        Ok((vector, coerced))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Value by column index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a JSON scalar as a finite number.
///
/// `None` means the caller should fill with zero: unparsable strings, null,
/// arrays, objects and non-finite numbers all end up here.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }?;

    // f64 values beyond f32 range would turn into infinities after the cast
    if number.is_finite() && (number as f32).is_finite() {
        Some(number)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Map<String, Value> {
        let value = json!({
            "id": 1,
            "consumption": 120,
            "voltage": 230,
            "current": 0.5,
            "power_factor": 0.98,
            "bill_to_usage_ratio": 1.1,
            "delta_units": 2,
            "rolling_avg": 100,
            "rolling_min": 90,
            "rolling_max": 130,
            "rolling_std": 5,
            "interaction_billing_pf": 1.07,
            "month_sin": 0.5,
            "month_cos": 0.87
        });
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce_numeric(&json!(12)), Some(12.0));
        assert_eq!(coerce_numeric(&json!(-0.25)), Some(-0.25));
        assert_eq!(coerce_numeric(&json!(1e3)), Some(1000.0));
    }

    #[test]
    fn test_coerce_strings() {
        assert_eq!(coerce_numeric(&json!("1.5")), Some(1.5));
        assert_eq!(coerce_numeric(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_numeric(&json!("1e3")), Some(1000.0));
        assert_eq!(coerce_numeric(&json!("")), None);
        assert_eq!(coerce_numeric(&json!("N/A")), None);
        assert_eq!(coerce_numeric(&json!("12kWh")), None);
    }

    #[test]
    fn test_coerce_non_finite_strings() {
        assert_eq!(coerce_numeric(&json!("NaN")), None);
        assert_eq!(coerce_numeric(&json!("inf")), None);
        assert_eq!(coerce_numeric(&json!("1e300")), None);
    }

    #[test]
    fn test_coerce_other_types() {
        assert_eq!(coerce_numeric(&json!(true)), Some(1.0));
        assert_eq!(coerce_numeric(&json!(false)), Some(0.0));
        assert_eq!(coerce_numeric(&Value::Null), None);
        assert_eq!(coerce_numeric(&json!([1, 2])), None);
        assert_eq!(coerce_numeric(&json!({"v": 1})), None);
    }

    #[test]
    fn test_from_record_order() {
        let (vector, coerced) = FeatureVector::from_record(&full_record()).unwrap();
        assert_eq!(coerced, 0);
        assert_eq!(vector.get(0), Some(120.0));
        assert_eq!(vector.get(1), Some(230.0));
        assert_eq!(vector.get(3), Some(0.98));
        assert_eq!(vector.get(12), Some(0.87));
        assert_eq!(vector.get(13), None);
    }

    #[test]
    fn test_from_record_zero_fill() {
        let mut record = full_record();
        record.insert("voltage".into(), json!(""));
        record.insert("rolling_std".into(), Value::Null);

        let (vector, coerced) = FeatureVector::from_record(&record).unwrap();
        assert_eq!(coerced, 2);
        assert_eq!(vector.get(1), Some(0.0));
        assert_eq!(vector.get(9), Some(0.0));
        assert_eq!(vector.get(0), Some(120.0));
    }

    #[test]
    fn test_from_record_missing_field() {
        let mut record = full_record();
        record.remove("power_factor");
        assert_eq!(FeatureVector::from_record(&record), Err("Power Factor"));

        let mut record = full_record();
        record.remove("month_cos");
        assert_eq!(FeatureVector::from_record(&record), Err("month_cos"));
    }

    #[test]
    fn test_from_record_ignores_extras() {
        let mut record = full_record();
        record.insert("rrno".into(), json!("RR-1042"));
        record.insert("Consumption".into(), json!(9999));

        let (vector, _) = FeatureVector::from_record(&record).unwrap();
        assert_eq!(vector.get(0), Some(120.0));
    }
}
