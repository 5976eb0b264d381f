//! Error types for the hosted_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the hosted_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed input data or missing required columns on load
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Requested window exceeds the bounds of the series
    #[error("Range error: {0}")]
    Range(String),

    /// Invalid forecast configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Forecast response cannot be reconciled with the request windows
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// The remote forecasting service did not answer within the timeout
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// The remote forecasting service failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Credential resolution failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV output
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

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
