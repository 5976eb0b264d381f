//! Time series loading and timestamp repair

use crate::error::{ForecastError, Result};
use crate::utils::{format_timestamp, parse_timestamp};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Policy applied to null target values during loading
///
/// The source dataset occasionally carries gaps in its target columns; the
/// policy is an explicit loader option so the repair is never silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// Carry the previous observed value forward; 0.0 when there is none
    Forward,
    /// Replace nulls with 0.0
    Zero,
    /// Treat any null target as a data format error
    Reject,
}

impl Default for FillPolicy {
    fn default() -> Self {
        FillPolicy::Forward
    }
}

/// Loader options naming the source columns and the repair behavior
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Column holding the calendar date (or a full timestamp)
    pub date_column: String,
    /// Integer hour-of-day column added to the date, when the date column
    /// lacks time-of-day granularity
    pub hour_column: Option<String>,
    /// Name of the resolved ISO 8601 timestamp column in the loaded series
    pub timestamp_column: String,
    /// Target value columns, in request order
    pub target_columns: Vec<String>,
    /// Null handling for target columns
    pub fill_policy: FillPolicy,
}

impl LoadOptions {
    /// Create options for a date column and a set of target columns
    pub fn new<S: Into<String>>(date_column: S, target_columns: Vec<String>) -> Self {
        Self {
            date_column: date_column.into(),
            hour_column: None,
            timestamp_column: "timestamp".to_string(),
            target_columns,
            fill_policy: FillPolicy::default(),
        }
    }

    /// Use a separate hour-of-day column to complete the date column
    pub fn with_hour_column<S: Into<String>>(mut self, hour_column: S) -> Self {
        self.hour_column = Some(hour_column.into());
        self
    }

    /// Override the name of the resolved timestamp column
    pub fn with_timestamp_column<S: Into<String>>(mut self, timestamp_column: S) -> Self {
        self.timestamp_column = timestamp_column.into();
        self
    }

    /// Override the null-fill policy
    pub fn with_fill_policy(mut self, fill_policy: FillPolicy) -> Self {
        self.fill_policy = fill_policy;
        self
    }
}

/// A loaded time series: resolved timestamps plus numeric target columns
///
/// Timestamps are strictly increasing ISO 8601 strings with no duplicates;
/// target columns hold no nulls. The series is read-only once loaded.
#[derive(Debug, Clone)]
pub struct SeriesData {
    df: DataFrame,
    timestamp_column: String,
    target_columns: Vec<String>,
}

/// Data loader for time series data
#[derive(Debug)]
pub struct SeriesLoader;

impl SeriesLoader {
    /// Load a time series from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<SeriesData> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df, options)
    }

    /// Build a time series from an existing DataFrame
    pub fn from_dataframe(df: DataFrame, options: &LoadOptions) -> Result<SeriesData> {
        Self::check_required_columns(&df, options)?;

        let timestamps = Self::resolve_timestamps(&df, options)?;
        Self::check_monotonic(&timestamps)?;

        let mut df = df;
        for target in &options.target_columns {
            let filled = Self::fill_target(&df, target, options.fill_policy)?;
            df.with_column(Series::new(target, filled))?;
        }

        let rendered: Vec<String> = timestamps.into_iter().map(format_timestamp).collect();
        df.with_column(Series::new(&options.timestamp_column, rendered))?;

        Ok(SeriesData {
            df,
            timestamp_column: options.timestamp_column.clone(),
            target_columns: options.target_columns.clone(),
        })
    }

    fn check_required_columns(df: &DataFrame, options: &LoadOptions) -> Result<()> {
        let names = df.get_column_names();

        let mut required = vec![options.date_column.as_str()];
        if let Some(hour) = &options.hour_column {
            required.push(hour.as_str());
        }
        for target in &options.target_columns {
            required.push(target.as_str());
        }

        let missing: Vec<&str> = required
            .into_iter()
            .filter(|name| !names.contains(name))
            .collect();

        if !missing.is_empty() {
            return Err(ForecastError::DataFormat(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        if options.target_columns.is_empty() {
            return Err(ForecastError::DataFormat(
                "At least one target column is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve each row to a full instant: calendar date plus hour offset
    fn resolve_timestamps(df: &DataFrame, options: &LoadOptions) -> Result<Vec<NaiveDateTime>> {
        let dates = Self::parse_date_column(df, &options.date_column)?;

        let timestamps = match &options.hour_column {
            Some(hour_column) => {
                let hours = Self::parse_hour_column(df, hour_column)?;
                dates
                    .into_iter()
                    .zip(hours)
                    .map(|(date, hour)| date + Duration::hours(hour))
                    .collect()
            }
            None => dates,
        };

        Ok(timestamps)
    }

    fn parse_date_column(df: &DataFrame, column_name: &str) -> Result<Vec<NaiveDateTime>> {
        let col = df.column(column_name)?;

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()
                .unwrap()
                .into_iter()
                .enumerate()
                .map(|(row, raw)| {
                    let raw = raw.ok_or_else(|| {
                        ForecastError::DataFormat(format!(
                            "Null date in column '{}' at row {}",
                            column_name, row
                        ))
                    })?;
                    Self::parse_date_value(raw, column_name, row)
                })
                .collect(),
            DataType::Date => col
                .date()
                .unwrap()
                .into_iter()
                .enumerate()
                .map(|(row, days)| {
                    let days = days.ok_or_else(|| {
                        ForecastError::DataFormat(format!(
                            "Null date in column '{}' at row {}",
                            column_name, row
                        ))
                    })?;
                    let epoch = NaiveDateTime::new(
                        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
                        NaiveTime::default(),
                    );
                    Ok(epoch + Duration::days(days as i64))
                })
                .collect(),
            other => Err(ForecastError::DataFormat(format!(
                "Column '{}' has unsupported date type {:?}",
                column_name, other
            ))),
        }
    }

    fn parse_date_value(raw: &str, column_name: &str, row: usize) -> Result<NaiveDateTime> {
        if let Ok(instant) = parse_timestamp(raw) {
            return Ok(instant);
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| NaiveDateTime::new(date, NaiveTime::default()))
            .map_err(|_| {
                ForecastError::DataFormat(format!(
                    "Unparsable date '{}' in column '{}' at row {}",
                    raw, column_name, row
                ))
            })
    }

    fn parse_hour_column(df: &DataFrame, column_name: &str) -> Result<Vec<i64>> {
        let col = df.column(column_name)?;

        let hours: Vec<Option<i64>> = match col.dtype() {
            DataType::Int64 => col.i64().unwrap().into_iter().collect(),
            DataType::Int32 => col
                .i32()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|v| v as i64))
                .collect(),
            DataType::UInt32 => col
                .u32()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|v| v as i64))
                .collect(),
            DataType::UInt64 => col
                .u64()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|v| v as i64))
                .collect(),
            other => {
                return Err(ForecastError::DataFormat(format!(
                    "Column '{}' has unsupported hour type {:?}",
                    column_name, other
                )))
            }
        };

        hours
            .into_iter()
            .enumerate()
            .map(|(row, hour)| {
                hour.ok_or_else(|| {
                    ForecastError::DataFormat(format!(
                        "Null hour in column '{}' at row {}",
                        column_name, row
                    ))
                })
            })
            .collect()
    }

    fn check_monotonic(timestamps: &[NaiveDateTime]) -> Result<()> {
        for (row, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ForecastError::DataFormat(format!(
                    "Timestamps not strictly increasing at row {}: {} then {}",
                    row + 1,
                    format_timestamp(pair[0]),
                    format_timestamp(pair[1])
                )));
            }
        }

        Ok(())
    }

    fn fill_target(df: &DataFrame, column_name: &str, policy: FillPolicy) -> Result<Vec<f64>> {
        let values = column_as_f64_opt(df, column_name)?;
        let nulls = values.iter().filter(|v| v.is_none()).count();

        if nulls == 0 {
            return Ok(values.into_iter().flatten().collect());
        }

        if policy == FillPolicy::Reject {
            return Err(ForecastError::DataFormat(format!(
                "Column '{}' has {} null values",
                column_name, nulls
            )));
        }

        debug!(column = column_name, nulls, ?policy, "filling null targets");

        let mut last = 0.0;
        let filled = values
            .into_iter()
            .map(|value| match (value, policy) {
                (Some(v), _) => {
                    last = v;
                    v
                }
                (None, FillPolicy::Forward) => last,
                (None, _) => 0.0,
            })
            .collect();

        Ok(filled)
    }
}

impl SeriesData {
    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the resolved timestamp column name
    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    /// Get the target column names
    pub fn target_columns(&self) -> &[String] {
        &self.target_columns
    }

    /// Get the resolved ISO 8601 timestamps
    pub fn timestamps(&self) -> Vec<String> {
        utf8_column(&self.df, &self.timestamp_column).unwrap_or_default()
    }

    /// Get the values of a target column
    pub fn target_values(&self, column_name: &str) -> Result<Vec<f64>> {
        column_as_f64(&self.df, column_name)
    }

    /// Get a contiguous sub-series of `length` rows starting at `start`
    pub fn slice(&self, start: usize, length: usize) -> SeriesData {
        SeriesData {
            df: self.df.slice(start as i64, length),
            timestamp_column: self.timestamp_column.clone(),
            target_columns: self.target_columns.clone(),
        }
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.df.height()
    }
}

/// Helper to read a column as f64 values, nulls preserved
pub(crate) fn column_as_f64_opt(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(column_name)
        .map_err(|e| ForecastError::DataFormat(format!("Column '{}' not found: {}", column_name, e)))?;

    match col.dtype() {
        DataType::Float64 => Ok(col.f64().unwrap().into_iter().collect()),
        DataType::Float32 => Ok(col
            .f32()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::Int64 => Ok(col
            .i64()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::Int32 => Ok(col
            .i32()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::UInt64 => Ok(col
            .u64()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        DataType::UInt32 => Ok(col
            .u32()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as f64))
            .collect()),
        _ => Err(ForecastError::DataFormat(format!(
            "Column '{}' cannot be converted to f64",
            column_name
        ))),
    }
}

/// Helper to read a column as f64 values, nulls dropped
pub(crate) fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<f64>> {
    Ok(column_as_f64_opt(df, column_name)?
        .into_iter()
        .flatten()
        .collect())
}

/// Helper to read a string column
pub(crate) fn utf8_column(df: &DataFrame, column_name: &str) -> Result<Vec<String>> {
    let col = df
        .column(column_name)
        .map_err(|e| ForecastError::DataFormat(format!("Column '{}' not found: {}", column_name, e)))?;

    match col.dtype() {
        DataType::Utf8 => Ok(col
            .utf8()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect()),
        _ => Err(ForecastError::DataFormat(format!(
            "Column '{}' is not a string column",
            column_name
        ))),
    }
}
