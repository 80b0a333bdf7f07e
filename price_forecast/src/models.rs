//! Pre-trained price models
//!
//! Models are fitted elsewhere and shipped as JSON artifacts. This module only
//! loads and evaluates them; nothing here trains or updates a model.

use crate::error::{ForecastError, Result};
use crate::forecast_service::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs;
use std::path::Path;
use tracing::info;

pub mod cache;
pub mod forest;
pub mod linear;

pub use cache::{clear_model_cache, load_model_cached};
pub use forest::{RandomForestRegressor, RegressionTree};
pub use linear::LinearRegressor;

/// A fitted point-prediction model over [`FeatureVector`]s
pub trait PriceModel: Debug + Send + Sync {
    /// Predict the price for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Serialized model as exported from the training environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(RandomForestRegressor),
    Linear(LinearRegressor),
}

impl ModelArtifact {
    /// Parse and validate an artifact from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(text)
            .map_err(|e| ForecastError::ModelLoadError(format!("Malformed model artifact: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read, parse and validate an artifact file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ForecastError::ModelLoadError(format!(
                "Cannot read model artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        let artifact = Self::from_json(&text)?;
        info!(path = %path.display(), model = artifact.name(), "loaded model artifact");
        Ok(artifact)
    }

    /// Serialize back to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the feature schema and the model structure
    pub fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::RandomForest(m) => {
                check_feature_names(&m.feature_names)?;
                m.validate()
            }
            ModelArtifact::Linear(m) => {
                check_feature_names(&m.feature_names)?;
                m.validate()
            }
        }
    }
}

impl PriceModel for ModelArtifact {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        match self {
            ModelArtifact::RandomForest(m) => m.predict(features),
            ModelArtifact::Linear(m) => m.predict(features),
        }
    }

    fn name(&self) -> &str {
        match self {
            ModelArtifact::RandomForest(m) => m.name(),
            ModelArtifact::Linear(m) => m.name(),
        }
    }
}

/// The artifact must have been fitted on exactly our feature layout
fn check_feature_names(names: &[String]) -> Result<()> {
    let expected = FeatureVector::FEATURE_NAMES;
    if names.len() != expected.len() || names.iter().zip(expected.iter()).any(|(a, b)| a != b) {
        return Err(ForecastError::ModelLoadError(format!(
            "Feature schema mismatch: model expects {:?}, features are {:?}",
            names, expected
        )));
    }
    Ok(())
}

/// Reject predictions the forecaster must never propagate
pub(crate) fn ensure_finite(model: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ForecastError::ModelInferenceError(format!(
            "{} produced a non-finite prediction ({})",
            model, value
        )))
    }
}

/// Feature names in model order, as owned strings
pub fn default_feature_names() -> Vec<String> {
    FeatureVector::FEATURE_NAMES
        .iter()
        .map(|s| s.to_string())
        .collect()
}
