//! Error types for the bun_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the bun_forecast crate
#[derive(Debug, Error)]
pub enum PredictorError {
    /// Historical batch is empty, too short, or missing required columns
    #[error("Input shape error: {0}")]
    InputShape(String),

    /// The train/test split produced an empty train or test side
    #[error("Temporal ordering error: {0}")]
    TemporalOrdering(String),

    /// Future weather outlook is short or has missing fields
    #[error("Forecast input error: {0}")]
    ForecastInput(String),

    /// A test day has zero actual demand, so percentage error is undefined
    #[error("Zero actual value: {0}")]
    ZeroActual(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    Data(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV export
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PredictorError>;

impl From<PolarsError> for PredictorError {
    fn from(err: PolarsError) -> Self {
        PredictorError::Polars(err.to_string())
    }
}
