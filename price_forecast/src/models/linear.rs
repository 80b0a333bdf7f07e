//! Linear regression over the feature vector

use crate::error::{ForecastError, Result};
use crate::forecast_service::features::FeatureVector;
use crate::models::{default_feature_names, ensure_finite, PriceModel};
use serde::{Deserialize, Serialize};

fn default_linear_name() -> String {
    "Linear Regressor".to_string()
}

/// `intercept + sum(coefficients[i] * x[i])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    /// Name of the model
    #[serde(default = "default_linear_name")]
    pub name: String,
    /// Feature names the model was fitted on
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegressor {
    /// Create a linear model over the standard feature layout
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        let model = Self {
            name: default_linear_name(),
            feature_names: default_feature_names(),
            intercept,
            coefficients,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        if self.coefficients.len() != FeatureVector::LEN {
            return Err(ForecastError::ModelLoadError(format!(
                "Linear model has {} coefficients, expected {}",
                self.coefficients.len(),
                FeatureVector::LEN
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::ModelLoadError(
                "Linear model has non-finite parameters".to_string(),
            ));
        }
        Ok(())
    }
}

impl PriceModel for LinearRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if self.coefficients.len() != FeatureVector::LEN {
            return Err(ForecastError::ModelInferenceError(format!(
                "{} expects {} inputs, got {}",
                self.name,
                self.coefficients.len(),
                FeatureVector::LEN
            )));
        }

        let value = features
            .to_array()
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (x, w)| acc + x * w);

        ensure_finite(&self.name, value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
