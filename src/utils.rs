//! Timestamp and frequency utilities for the hosted_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDateTime};

/// Canonical ISO 8601 form used for every timestamp exchanged by this crate
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Render an instant in the canonical ISO 8601 form
pub fn format_timestamp(instant: NaiveDateTime) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp in the canonical ISO 8601 form
///
/// A space-separated variant is accepted on input since upstream services
/// are not consistent about the `T` separator.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| ForecastError::DataFormat(format!("Invalid timestamp '{}': {}", raw, e)))
}

/// Resolve a frequency token to the interval between consecutive rows
pub fn frequency_step(frequency: &str) -> Result<Duration> {
    let duration = match frequency {
        "daily" | "d" | "1d" => Duration::days(1),
        "weekly" | "w" | "1w" => Duration::weeks(1),
        "monthly" | "m" | "1m" => Duration::days(30),
        "hourly" | "h" | "1h" => Duration::hours(1),
        "minute" | "min" | "1min" => Duration::minutes(1),
        _ => {
            return Err(ForecastError::Config(format!(
                "Unsupported frequency: {}",
                frequency
            )))
        }
    };

    Ok(duration)
}

/// Create future timestamps following the last observed one
pub fn future_timestamps(
    last_timestamp: NaiveDateTime,
    horizon: usize,
    frequency: &str,
) -> Result<Vec<NaiveDateTime>> {
    let duration = frequency_step(frequency)?;

    let mut timestamps = Vec::with_capacity(horizon);
    let mut current = last_timestamp;

    for _ in 0..horizon {
        current += duration;
        timestamps.push(current);
    }

    Ok(timestamps)
}
