//! # Mandi Sense
//!
//! `mandi_sense_workspace` bundles the crates of the Mandi Sense project, a
//! short-term forecaster for wholesale onion prices in Maharashtra mandis.
//!
//! ## Example
//!
//! ```
//! use mandi_sense_workspace::forecast::models::LinearRegressor;
//! use mandi_sense_workspace::forecast::{forecast, FeatureVector, PriceSeries};
//! use chrono::NaiveDate;
//!
//! // Echo yesterday's price
//! let mut coefficients = vec![0.0; FeatureVector::LEN];
//! coefficients[3] = 1.0;
//! let model = LinearRegressor::new(0.0, coefficients).unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let history = PriceSeries::from_pairs(vec![(day, 1200.0)]).unwrap();
//!
//! let table = forecast(&model, &history, 3).unwrap();
//! assert_eq!(table.values(), vec![1200.0; 3]);
//! ```

/// Forecasting core, data loading and model artifacts
pub use price_forecast as forecast;

pub use price_forecast::{ForecastError, ForecastService, ForecastTable, Result};
