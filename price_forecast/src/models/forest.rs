//! Random forest regressor evaluated from exported tree arrays

use crate::error::{ForecastError, Result};
use crate::forecast_service::features::FeatureVector;
use crate::models::{default_feature_names, ensure_finite, PriceModel};
use serde::{Deserialize, Serialize};

/// Child index marking a leaf
pub const TREE_LEAF: i64 = -1;

/// A single regression tree in flat array layout.
///
/// Node `i` is internal when `children_left[i] != TREE_LEAF`; the descent goes
/// left when `features[feature[i]] <= threshold[i]`, with the feature first
/// rounded to `f32` as the exporting trees were fitted on `f32` inputs.
/// Leaves carry their prediction in `value[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    /// Create a tree from its node arrays
    pub fn new(
        children_left: Vec<i64>,
        children_right: Vec<i64>,
        feature: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<f64>,
    ) -> Result<Self> {
        let tree = Self {
            children_left,
            children_right,
            feature,
            threshold,
            value,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// A tree with a single leaf
    pub fn leaf(value: f64) -> Self {
        Self {
            children_left: vec![TREE_LEAF],
            children_right: vec![TREE_LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    /// A depth-one tree splitting on `feature <= threshold`
    pub fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Self {
        Self {
            children_left: vec![1, TREE_LEAF, TREE_LEAF],
            children_right: vec![2, TREE_LEAF, TREE_LEAF],
            feature: vec![feature as i64, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![(left + right) / 2.0, left, right],
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.value.len()
    }

    /// Check array lengths, index ranges and that every descent terminates
    pub fn validate(&self) -> Result<()> {
        let n = self.value.len();
        if n == 0 {
            return Err(ForecastError::ModelLoadError(
                "Regression tree has no nodes".to_string(),
            ));
        }
        if self.children_left.len() != n
            || self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
        {
            return Err(ForecastError::ModelLoadError(format!(
                "Regression tree arrays differ in length (value has {} nodes)",
                n
            )));
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];

            if left == TREE_LEAF {
                if right != TREE_LEAF {
                    return Err(ForecastError::ModelLoadError(format!(
                        "Node {} has a right child but no left child",
                        node
                    )));
                }
                if !self.value[node].is_finite() {
                    return Err(ForecastError::ModelLoadError(format!(
                        "Leaf {} has a non-finite value",
                        node
                    )));
                }
                continue;
            }

            // Children always follow their parent, so every descent ends at a leaf
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ForecastError::ModelLoadError(format!(
                        "Node {} has invalid child index {}",
                        node, child
                    )));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature >= FeatureVector::LEN as i64 {
                return Err(ForecastError::ModelLoadError(format!(
                    "Node {} splits on unknown feature {}",
                    node, feature
                )));
            }
            if !self.threshold[node].is_finite() {
                return Err(ForecastError::ModelLoadError(format!(
                    "Node {} has a non-finite threshold",
                    node
                )));
            }
        }

        Ok(())
    }

    /// Walk the tree for one input row
    pub fn predict(&self, x: &[f64; FeatureVector::LEN]) -> Result<f64> {
        let mut node = 0usize;
        // a well-formed tree reaches a leaf in fewer than node_count steps
        for _ in 0..self.node_count() {
            let left = *self.children_left.get(node).ok_or_else(|| bad_node(node))?;
            if left == TREE_LEAF {
                return self.value.get(node).copied().ok_or_else(|| bad_node(node));
            }

            let feature = *self.feature.get(node).ok_or_else(|| bad_node(node))?;
            let threshold = *self.threshold.get(node).ok_or_else(|| bad_node(node))?;
            let value = usize::try_from(feature)
                .ok()
                .and_then(|idx| x.get(idx))
                .map(|v| f64::from(*v as f32))
                .ok_or_else(|| bad_node(node))?;

            let next = if value <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or_else(|| bad_node(node))?
            };
            node = usize::try_from(next).map_err(|_| bad_node(node))?;
        }

        Err(ForecastError::ModelInferenceError(
            "Regression tree descent did not reach a leaf".to_string(),
        ))
    }
}

fn bad_node(node: usize) -> ForecastError {
    ForecastError::ModelInferenceError(format!("Regression tree node {} is malformed", node))
}

fn default_forest_name() -> String {
    "Random Forest Regressor".to_string()
}

/// Average of an ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    /// Name of the model
    #[serde(default = "default_forest_name")]
    pub name: String,
    /// Feature names the forest was fitted on
    pub feature_names: Vec<String>,
    /// Fitted trees
    pub trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Create a forest over the standard feature layout
    pub fn new(trees: Vec<RegressionTree>) -> Result<Self> {
        let forest = Self {
            name: default_forest_name(),
            feature_names: default_feature_names(),
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    /// Set the model name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Number of trees
    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ForecastError::ModelLoadError(
                "Random forest contains no trees".to_string(),
            ));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| {
                ForecastError::ModelLoadError(format!("Tree {}: {}", idx, e))
            })?;
        }
        Ok(())
    }
}

impl PriceModel for RandomForestRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if !features.is_finite() {
            return Err(ForecastError::ModelInferenceError(format!(
                "{} received non-finite features: {:?}",
                self.name, features
            )));
        }
        if self.trees.is_empty() {
            return Err(ForecastError::ModelInferenceError(
                "Random forest contains no trees".to_string(),
            ));
        }

        let x = features.to_array();
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict(&x)?;
        }

        ensure_finite(&self.name, total / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
