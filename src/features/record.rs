//! Request batch parsing - JSON records to model rows

use serde_json::{Map, Value};

use super::layout::ID_FIELD;
use super::vector::FeatureVector;

/// Errors while shaping a request body into model rows
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// A required field is absent from a record (model column name, or `id`)
    #[error("{0}")]
    MissingField(&'static str),

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    #[error("record {0} is not a JSON object")]
    NotAnObject(usize),

    #[error("record {index} has an invalid id: {value}")]
    InvalidId { index: usize, value: Value },
}

/// Parsed request: ids and feature rows, index-aligned
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub ids: Vec<i64>,
    pub rows: Vec<FeatureVector>,
    /// Number of feature values zero-filled across the batch
    pub coerced: usize,
}

impl RecordBatch {
    /// Parse a raw request body.
    pub fn from_json(body: &[u8]) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    /// Shape a JSON array of records into model rows.
    ///
    /// Fails on the first record that lacks `id` or any feature field; no
    /// partial batch is ever returned.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let records = match value {
            Value::Array(records) => records,
            other => return Err(RecordError::NotAnArray(json_type_name(&other))),
        };

        let mut batch = Self {
            ids: Vec::with_capacity(records.len()),
            rows: Vec::with_capacity(records.len()),
            coerced: 0,
        };

        for (index, record) in records.iter().enumerate() {
            let record = record.as_object().ok_or(RecordError::NotAnObject(index))?;

            batch.ids.push(parse_id(index, record)?);

            let (row, coerced) =
                FeatureVector::from_record(record).map_err(RecordError::MissingField)?;
            batch.rows.push(row);
            batch.coerced += coerced;
        }

        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read the record id as an integer.
///
/// Accepts integers, integral floats (`3.0`) and integer strings (`"3"`).
fn parse_id(index: usize, record: &Map<String, Value>) -> Result<i64, RecordError> {
    let raw = record
        .get(ID_FIELD)
        .ok_or(RecordError::MissingField(ID_FIELD))?;

    let id = match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    id.ok_or_else(|| RecordError::InvalidId {
        index,
        value: raw.clone(),
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
