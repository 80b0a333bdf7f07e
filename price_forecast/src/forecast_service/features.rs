//! Feature vector construction for the price model.
//!
//! The model was fitted on nine features in a fixed order: three calendar
//! features of the target date followed by lags and rolling statistics of
//! the price history. The layout here must stay in lockstep with the
//! training pipeline; a mismatch does not fail loudly, it just degrades
//! every prediction.

use crate::error::{ForecastError, Result};
use crate::series::PriceSeries;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Width of the short rolling window
pub const SHORT_WINDOW: usize = 7;
/// Width of the long rolling window
pub const LONG_WINDOW: usize = 14;

/// Model input for a single target date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    /// 1..=12
    pub month: u32,
    /// ISO-8601 week, 1..=53
    pub week_of_year: u32,
    pub lag_1: f64,
    pub lag_3: f64,
    pub lag_7: f64,
    pub roll_mean_7: f64,
    /// Sample standard deviation (n - 1), 0.0 for a single observation
    pub roll_std_7: f64,
    pub roll_mean_14: f64,
}

impl FeatureVector {
    /// Number of model inputs
    pub const LEN: usize = 9;

    /// Feature names in model input order
    pub const FEATURE_NAMES: [&'static str; Self::LEN] = [
        "day_of_week",
        "month",
        "week_of_year",
        "lag_1",
        "lag_3",
        "lag_7",
        "roll_mean_7",
        "roll_std_7",
        "roll_mean_14",
    ];

    /// Values in model input order
    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.day_of_week as f64,
            self.month as f64,
            self.week_of_year as f64,
            self.lag_1,
            self.lag_3,
            self.lag_7,
            self.roll_mean_7,
            self.roll_std_7,
            self.roll_mean_14,
        ]
    }

    /// True when every value is finite
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Value `n` positions from the end of `values`, if there are that many
fn lag(values: &[f64], n: usize) -> Option<f64> {
    values.len().checked_sub(n).map(|idx| values[idx])
}

/// Trailing window of at most `width` values
fn trailing(values: &[f64], width: usize) -> &[f64] {
    &values[values.len().saturating_sub(width)..]
}

/// Build the feature vector for `target_date` from a price history.
///
/// `history` is ordered oldest to newest. Lags count positions from the end,
/// not calendar days. Short histories fall back along the chain
/// `lag_7 -> lag_3 -> lag_1`.
pub fn synthesize(history: &[f64], target_date: NaiveDate) -> Result<FeatureVector> {
    let lag_1 = lag(history, 1).ok_or_else(|| {
        ForecastError::DataError(
            "insufficient history: at least one price is required to build features".to_string(),
        )
    })?;
    let lag_3 = lag(history, 3).unwrap_or(lag_1);
    let lag_7 = lag(history, SHORT_WINDOW).unwrap_or(lag_3);

    let short = trailing(history, SHORT_WINDOW);
    let roll_mean_7 = short.iter().mean();
    let roll_std_7 = if short.len() > 1 {
        short.iter().std_dev()
    } else {
        0.0
    };

    let roll_mean_14 = trailing(history, LONG_WINDOW).iter().mean();

    Ok(FeatureVector {
        day_of_week: target_date.weekday().num_days_from_monday(),
        month: target_date.month(),
        week_of_year: target_date.iso_week().week(),
        lag_1,
        lag_3,
        lag_7,
        roll_mean_7,
        roll_std_7,
        roll_mean_14,
    })
}

/// [`synthesize`] over the prices of a [`PriceSeries`]
pub fn synthesize_from_series(history: &PriceSeries, target_date: NaiveDate) -> Result<FeatureVector> {
    synthesize(&history.values(), target_date)
}
