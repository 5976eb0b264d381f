//! Forecast request configuration and wire rows

use crate::error::{ForecastError, Result};
use crate::utils::frequency_step;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable description of a forecast request
///
/// Names the identifier, timestamp, and target columns of the request rows,
/// the sampling frequency, and the requested horizon. Constructed once per
/// run and passed by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastConfig {
    id_column: String,
    timestamp_column: String,
    target_columns: Vec<String>,
    frequency: String,
    prediction_length: usize,
}

impl ForecastConfig {
    /// Create a validated forecast configuration
    pub fn new<S: Into<String>>(
        id_column: S,
        timestamp_column: S,
        target_columns: Vec<String>,
        frequency: S,
        prediction_length: usize,
    ) -> Result<Self> {
        if target_columns.is_empty() {
            return Err(ForecastError::Config(
                "At least one target column is required".to_string(),
            ));
        }

        if prediction_length == 0 {
            return Err(ForecastError::Config(
                "Prediction length must be positive".to_string(),
            ));
        }

        let frequency = frequency.into();
        frequency_step(&frequency)?;

        Ok(Self {
            id_column: id_column.into(),
            timestamp_column: timestamp_column.into(),
            target_columns,
            frequency,
            prediction_length,
        })
    }

    /// Get the identifier column name
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Get the timestamp column name
    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    /// Get the target column names
    pub fn target_columns(&self) -> &[String] {
        &self.target_columns
    }

    /// Get the frequency token
    pub fn frequency(&self) -> &str {
        &self.frequency
    }

    /// Get the requested horizon
    pub fn prediction_length(&self) -> usize {
        self.prediction_length
    }

    /// Get the interval between consecutive rows
    pub fn step(&self) -> Result<Duration> {
        frequency_step(&self.frequency)
    }
}

/// One row exchanged with the forecasting service
///
/// Column naming on the wire follows the [`ForecastConfig`]; in memory the
/// row is keyed structurally.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    /// Window identifier the row belongs to
    pub id: String,
    /// ISO 8601 timestamp
    pub timestamp: String,
    /// Target values by column name
    pub values: BTreeMap<String, f64>,
}

impl ForecastRow {
    /// Create a row with a single target value
    pub fn single<S: Into<String>>(id: S, timestamp: S, column: S, value: f64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(column.into(), value);

        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            values,
        }
    }

    /// Get a target value by column name
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}
