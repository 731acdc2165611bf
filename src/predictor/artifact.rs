//! Serialized regression model artifacts
//!
//! Two artifact kinds are understood:
//! - `linear`: intercept plus one coefficient per feature
//! - `forest`: averaged regression trees in the parallel-array layout
//!   (`children_left`, `children_right`, `feature`, `threshold`, `value`)
//!   where `-1` marks a leaf.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::Pm25Model;
use crate::models::FEATURE_NAMES;
use crate::{AqiError, Result};

const LEAF: i64 = -1;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    Forest(ForestModel),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    pub feature_names: Vec<String>,
    pub trees: Vec<RegressionTree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionModel {
    /// Load and validate an artifact from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AqiError::model(format!(
                "Failed to read model artifact {}: {e}",
                path.display()
            ))
        })?;
        let model = Self::from_json(&raw)?;
        info!("Loaded {} model from {}", model.kind(), path.display());
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let model: RegressionModel = serde_json::from_str(raw)
            .map_err(|e| AqiError::model(format!("Invalid model artifact: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    fn feature_names(&self) -> &[String] {
        match self {
            RegressionModel::Linear(m) => &m.feature_names,
            RegressionModel::Forest(m) => &m.feature_names,
        }
    }

    fn validate(&self) -> Result<()> {
        let names = self.feature_names();
        if names.len() != FEATURE_NAMES.len()
            || names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
        {
            return Err(AqiError::model(format!(
                "Model was trained on features {names:?}, expected {FEATURE_NAMES:?}"
            )));
        }

        match self {
            RegressionModel::Linear(m) => {
                if m.coefficients.len() != FEATURE_NAMES.len() {
                    return Err(AqiError::model(format!(
                        "Linear model has {} coefficients, expected {}",
                        m.coefficients.len(),
                        FEATURE_NAMES.len()
                    )));
                }
                Ok(())
            }
            RegressionModel::Forest(m) => {
                if m.trees.is_empty() {
                    return Err(AqiError::model("Forest model has no trees"));
                }
                for (index, tree) in m.trees.iter().enumerate() {
                    tree.validate()
                        .map_err(|e| AqiError::model(format!("Tree {index}: {e}")))?;
                }
                Ok(())
            }
        }
    }
}

impl Pm25Model for RegressionModel {
    fn kind(&self) -> &'static str {
        match self {
            RegressionModel::Linear(_) => "linear",
            RegressionModel::Forest(_) => "forest",
        }
    }

    fn predict_row(&self, row: &[f64; 4]) -> Result<f64> {
        match self {
            RegressionModel::Linear(m) => Ok(m.intercept
                + m.coefficients
                    .iter()
                    .zip(row)
                    .map(|(c, x)| c * x)
                    .sum::<f64>()),
            RegressionModel::Forest(m) => {
                let total: f64 = m.trees.iter().map(|tree| tree.predict(row)).sum();
                Ok(total / m.trees.len() as f64)
            }
        }
    }
}

impl RegressionTree {
    /// Children always sit after their parent, which rules out cycles.
    fn validate(&self) -> std::result::Result<(), String> {
        let n = self.value.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("node arrays have different lengths".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                continue;
            }
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(format!("node {node} has invalid children ({left}, {right})"));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= FEATURE_NAMES.len() {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
        }
        Ok(())
    }

    fn predict(&self, row: &[f64; 4]) -> f64 {
        let mut node = 0;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}
