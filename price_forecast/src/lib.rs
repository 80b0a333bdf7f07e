//! # Price Forecast
//!
//! Short-term mandi price forecasting with a pre-trained regression model.
//!
//! ## Features
//!
//! - Loading raw market reports from CSV and collapsing them to one row per date
//! - Calendar, lag and rolling-window features matching the model's training layout
//! - Iterative multi-step forecasting that feeds each prediction back as history
//! - Random forest and linear model artifacts loaded from JSON, cached per process
//! - Hold-out backtesting and chart-ready frames for a presentation layer
//!
//! ## Quick Start
//!
//! ```no_run
//! use price_forecast::data::DataLoader;
//! use price_forecast::forecast_service::forecast;
//! use price_forecast::models::ModelArtifact;
//! use price_forecast::utils::DateOrder;
//!
//! # fn main() -> price_forecast::Result<()> {
//! let daily = DataLoader::load_daily("data/processed/onion_maharashtra_cleaned.csv", DateOrder::MonthFirst)?;
//! let model = ModelArtifact::load("models/onion_maharashtra_rf.json")?;
//!
//! let table = forecast(&model, &daily.price_series()?, 7)?;
//! for row in table.rows() {
//!     println!("{} {:.2}", row.date, row.predicted_price);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod forecast_service;
pub mod metrics;
pub mod models;
pub mod series;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{aggregate, DailyPrice, DailyPriceTable, DataLoader, RawRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::forecast_service::features::{synthesize, FeatureVector};
pub use crate::forecast_service::{forecast, ForecastReport, ForecastRow, ForecastService, ForecastTable};
pub use crate::models::{ModelArtifact, PriceModel};
pub use crate::series::{PricePoint, PriceSeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
