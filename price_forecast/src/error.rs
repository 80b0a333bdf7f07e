//! Error types for the price_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed or empty historical data, or not enough history to forecast
    #[error("Data error: {0}")]
    DataError(String),

    /// Model artifact missing, corrupt or incompatible with the feature schema
    #[error("Model load error: {0}")]
    ModelLoadError(String),

    /// Model rejected a feature vector or produced an unusable prediction
    #[error("Model inference error: {0}")]
    ModelInferenceError(String),

    /// Error related to invariant validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from JSON encoding or decoding
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::JsonError(err.to_string())
    }
}

impl ForecastError {
    /// True for failures caused by the model rather than the data or arguments
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            ForecastError::ModelLoadError(_) | ForecastError::ModelInferenceError(_)
        )
    }
}
