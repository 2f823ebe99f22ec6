//! XGBoost JSON model schema
//!
//! Only the parts of `Booster.save_model("*.json")` needed for binary tree
//! prediction are modelled; every other key in the file is ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};

// --- Custom deserializers for XGBoost-specific formats ------------------------------

/// `base_score` shows up as `0.5`, `"0.5"`, `[0.5]` or `"[5E-1]"` depending
/// on the XGBoost version that wrote the file. Only the first value is used.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        match cur {
            Value::Number(n) => {
                return n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SerdeError::custom("invalid base_score number"));
            }
            Value::String(s) => {
                let t = s.trim();
                if let Ok(f) = t.parse::<f32>() {
                    return Ok(f);
                }
                let inner = t
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or_else(|| {
                        SerdeError::custom(format!("cannot parse base_score from string: {s}"))
                    })?;
                cur = Value::Array(
                    inner
                        .split(',')
                        .map(|part| Value::String(part.trim().to_string()))
                        .collect(),
                );
            }
            Value::Array(arr) => {
                cur = arr
                    .into_iter()
                    .next()
                    .ok_or_else(|| SerdeError::custom("empty base_score array"))?;
            }
            _ => {
                return Err(SerdeError::custom(
                    "base_score must be number, string, or array",
                ))
            }
        }
    }
}

fn default_num_class() -> i64 {
    0
}

// --- Tree / model level definitions -------------------------------------------------

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_nodes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    pub split_conditions: Vec<f32>,
    pub default_left: Vec<i32>,
    /// Non-zero entries mark categorical splits
    #[serde(default)]
    pub split_type: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub tree_info: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GbTreeDefinition {
    pub model: ModelTrees,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree {
        model: ModelTrees,
    },
    Dart {
        gbtree: GbTreeDefinition,
        weight_drop: Vec<f32>,
    },
    Gblinear {},
}

impl GradientBooster {
    pub fn name(&self) -> &'static str {
        match self {
            GradientBooster::Gbtree { .. } => "gbtree",
            GradientBooster::Dart { .. } => "dart",
            GradientBooster::Gblinear {} => "gblinear",
        }
    }
}

// --- Learner-level definitions -----------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Objective {
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: f32,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_num_class")]
    pub num_class: i64,
    #[serde_as(as = "DisplayFromStr")]
    pub num_feature: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: Objective,
    pub learner_model_param: LearnerModelParam,
}

// --- Top-level model -------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    pub learner: Learner,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn param(base_score: Value) -> LearnerModelParam {
        serde_json::from_value(json!({
            "base_score": base_score,
            "num_class": "0",
            "num_feature": "13"
        }))
        .unwrap()
    }

    #[test]
    fn base_score_parses_number_string_array_and_bracketed() {
        assert_eq!(param(json!(0.25)).base_score, 0.25);
        assert_eq!(param(json!("0.25")).base_score, 0.25);
        assert_eq!(param(json!([0.25])).base_score, 0.25);
        assert_eq!(param(json!("[2.5E-1]")).base_score, 0.25);
    }

    #[test]
    fn base_score_rejects_garbage() {
        let result: Result<LearnerModelParam, _> = serde_json::from_value(json!({
            "base_score": "half",
            "num_class": "0",
            "num_feature": "13"
        }));
        assert!(result.is_err());

        let result: Result<LearnerModelParam, _> = serde_json::from_value(json!({
            "base_score": [],
            "num_class": "0",
            "num_feature": "13"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn stringly_typed_params() {
        let p = param(json!(0.5));
        assert_eq!(p.num_class, 0);
        assert_eq!(p.num_feature, 13);

        let p: LearnerModelParam =
            serde_json::from_value(json!({"base_score": 0.5, "num_feature": "4"})).unwrap();
        assert_eq!(p.num_class, 0);
    }

    #[test]
    fn booster_variants() {
        let gbtree: GradientBooster = serde_json::from_value(json!({
            "name": "gbtree",
            "model": {"trees": [], "tree_info": [], "gbtree_model_param": {"num_trees": "0"}}
        }))
        .unwrap();
        assert_eq!(gbtree.name(), "gbtree");

        let linear: GradientBooster = serde_json::from_value(json!({
            "name": "gblinear",
            "model": {"weights": [0.1, 0.2]}
        }))
        .unwrap();
        assert_eq!(linear.name(), "gblinear");

        let dart: GradientBooster = serde_json::from_value(json!({
            "name": "dart",
            "gbtree": {"name": "gbtree", "model": {"trees": [], "tree_info": []}},
            "weight_drop": []
        }))
        .unwrap();
        assert_eq!(dart.name(), "dart");
    }
}
