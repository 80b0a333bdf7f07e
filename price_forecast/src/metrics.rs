//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use crate::forecast_service::{forecast, ForecastTable};
use crate::models::PriceModel;
use crate::series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, over non-zero actuals
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::ValidationError(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let (pct_sum, pct_count) = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (&a, &e)| {
            (sum + e.abs() / a.abs() * 100.0, count + 1)
        });
    let mape = if pct_count > 0 {
        pct_sum / pct_count as f64
    } else {
        0.0
    };

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Outcome of forecasting a held-out tail of the history
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    /// Last date the model was allowed to see
    pub cutoff_date: NaiveDate,
    pub forecast: ForecastTable,
    /// Observed prices for the forecast dates (positional)
    pub actual: Vec<f64>,
    pub accuracy: ForecastAccuracy,
}

/// Hold out the last `horizon_days` points, forecast them from the rest and
/// score the result.
///
/// Forecast dates are consecutive calendar days while the held-out points may
/// have gaps; predictions and actuals are paired by position.
pub fn backtest<M>(model: &M, series: &PriceSeries, horizon_days: usize) -> Result<BacktestResult>
where
    M: PriceModel + ?Sized,
{
    if horizon_days == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon_days must be at least 1".to_string(),
        ));
    }
    if series.len() <= horizon_days {
        return Err(ForecastError::DataError(format!(
            "Backtest needs more than {} points, series has {}",
            horizon_days,
            series.len()
        )));
    }

    let train = series.truncated(horizon_days);
    let actual: Vec<f64> = series.tail(horizon_days).iter().map(|p| p.price).collect();
    let cutoff_date = train.last_date().ok_or_else(|| {
        ForecastError::DataError("Backtest training window is empty".to_string())
    })?;

    let predicted = forecast(model, &train, horizon_days)?;
    let accuracy = forecast_accuracy(&predicted.values(), &actual)?;

    Ok(BacktestResult {
        cutoff_date,
        forecast: predicted,
        actual,
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accuracy_values() {
        let acc = forecast_accuracy(&[105.0, 106.0, 107.0], &[106.0, 107.0, 108.0]).unwrap();
        assert_relative_eq!(acc.mae, 1.0);
        assert_relative_eq!(acc.mse, 1.0);
        assert_relative_eq!(acc.rmse, 1.0);
        assert!(acc.mape > 0.9 && acc.mape < 1.0);
    }

    #[test]
    fn test_accuracy_length_mismatch() {
        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }

    #[test]
    fn test_zero_actuals_skipped_in_mape() {
        let acc = forecast_accuracy(&[1.0, 0.0], &[0.0, 0.0]).unwrap();
        assert_eq!(acc.mape, 0.0);
        assert_relative_eq!(acc.smape, 100.0);
    }
}
