//! Forecast configuration

use crate::error::{ForecastError, Result};
use crate::utils::DateOrder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one forecast run.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Cleaned mandi price reports (CSV)
    pub data_path: PathBuf,
    /// Fitted model artifact (JSON)
    pub model_path: PathBuf,
    /// Days to forecast
    pub horizon_days: usize,
    /// Upper bound accepted for `horizon_days`
    pub max_horizon_days: usize,
    /// Days of history shown next to the forecast
    pub history_window_days: usize,
    /// How to read ambiguous numeric dates in the dataset
    pub date_order: DateOrder,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/processed/onion_maharashtra_cleaned.csv"),
            model_path: PathBuf::from("models/onion_maharashtra_rf.json"),
            horizon_days: 7,
            max_horizon_days: 14,
            history_window_days: 90,
            date_order: DateOrder::MonthFirst,
        }
    }
}

impl ForecastConfig {
    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: ForecastConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the forecast horizon
    pub fn with_horizon(mut self, horizon_days: usize) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon_days must be at least 1".to_string(),
            ));
        }
        if self.horizon_days > self.max_horizon_days {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon_days ({}) exceeds max_horizon_days ({})",
                self.horizon_days, self.max_horizon_days
            )));
        }
        if self.history_window_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "history_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
