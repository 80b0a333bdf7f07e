//! Iterative multi-step forecasting
//!
//! A one-step model is rolled forward: each prediction is appended to a
//! working copy of the history and feeds the lag and rolling features of the
//! next step. The caller's history is never modified.

use crate::config::ForecastConfig;
use crate::data::{DailyPriceTable, DataLoader};
use crate::error::{ForecastError, Result};
use crate::models::{load_model_cached, PriceModel};
use crate::series::PriceSeries;
use crate::utils::{future_dates, ChartFrame};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod features;

use features::synthesize_from_series;

/// Predicted price for one future date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted_price: f64,
}

/// Forecast rows, one per future day, ascending by date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Get the forecast rows
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Get the predicted prices
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.predicted_price).collect()
    }

    /// Get the forecast dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Number of forecast days
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// JSON array of `{date, predicted_price}`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// CSV with a `date,predicted_price` header
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ForecastError::CsvError(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ForecastError::CsvError(e.to_string()))
    }
}

/// Roll `model` forward `horizon_days` days past the end of `history`.
///
/// Target dates advance one calendar day per step from the last historical
/// date, whatever gaps the history itself has.
pub fn forecast<M>(model: &M, history: &PriceSeries, horizon_days: usize) -> Result<ForecastTable>
where
    M: PriceModel + ?Sized,
{
    if horizon_days == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon_days must be at least 1".to_string(),
        ));
    }

    let last_date = history.last_date().ok_or_else(|| {
        ForecastError::DataError(
            "insufficient history: the price series is empty, nothing to forecast from".to_string(),
        )
    })?;

    let mut working = history.clone();
    let mut rows = Vec::with_capacity(horizon_days);

    for target_date in future_dates(last_date, horizon_days)? {
        let features = synthesize_from_series(&working, target_date)?;
        let predicted_price = model.predict(&features).map_err(|e| match e {
            ForecastError::ModelInferenceError(_) => e,
            other => ForecastError::ModelInferenceError(other.to_string()),
        })?;
        // a negative or non-finite price must never reach the working history
        if !predicted_price.is_finite() || predicted_price < 0.0 {
            return Err(ForecastError::ModelInferenceError(format!(
                "{} returned {} for {}",
                model.name(),
                predicted_price,
                target_date
            )));
        }

        debug!(date = %target_date, ?features, predicted_price, "forecast step");

        working.push(target_date, predicted_price)?;
        rows.push(ForecastRow {
            date: target_date,
            predicted_price,
        });
    }

    Ok(ForecastTable { rows })
}

/// Everything a front end needs to show one forecast
#[derive(Debug, Clone)]
pub struct ForecastReport {
    /// Aggregated historical data
    pub daily: DailyPriceTable,
    /// Historical average modal prices the forecast started from
    pub history: PriceSeries,
    pub forecast: ForecastTable,
    pub model_name: String,
}

impl ForecastReport {
    /// Recent history merged with the forecast
    pub fn chart_frame(&self, history_window_days: usize) -> ChartFrame {
        ChartFrame::merge(&self.history, &self.forecast, history_window_days)
    }
}

/// Dataset-to-forecast pipeline driven by a [`ForecastConfig`]
#[derive(Debug, Clone)]
pub struct ForecastService {
    config: ForecastConfig,
}

impl ForecastService {
    /// Create a service after validating the configuration
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Load the configured dataset as a daily table
    pub fn load_daily(&self) -> Result<DailyPriceTable> {
        DataLoader::load_daily(&self.config.data_path, self.config.date_order)
    }

    /// Forecast with the configured model, loaded through the process-wide cache
    pub fn run(&self) -> Result<ForecastReport> {
        let model = load_model_cached(&self.config.model_path)?;
        self.run_with_model(&*model)
    }

    /// Forecast with an already loaded model
    pub fn run_with_model(&self, model: &dyn PriceModel) -> Result<ForecastReport> {
        let daily = self.load_daily()?;
        if daily.is_empty() {
            return Err(ForecastError::DataError(format!(
                "No usable rows in {} after cleaning",
                self.config.data_path.display()
            )));
        }

        let history = daily.price_series()?;
        let forecast = forecast(model, &history, self.config.horizon_days)?;

        info!(
            model = model.name(),
            history_days = history.len(),
            horizon_days = forecast.len(),
            "forecast complete"
        );

        Ok(ForecastReport {
            daily,
            history,
            forecast,
            model_name: model.name().to_string(),
        })
    }
}
