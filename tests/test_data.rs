use hosted_forecast::data::{FillPolicy, LoadOptions, SeriesLoader};
use hosted_forecast::error::ForecastError;
use polars::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

// Helper function to create a CSV with a date column and an hour-of-day column
fn create_hourly_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hour,consumption").unwrap();
    writeln!(file, "2016-07-01,0,622.0").unwrap();
    writeln!(file, "2016-07-01,1,598.0").unwrap();
    writeln!(file, "2016-07-01,2,570.5").unwrap();
    writeln!(file, "2016-07-01,3,561.0").unwrap();
    file
}

fn hourly_options() -> LoadOptions {
    LoadOptions::new("date", vec!["consumption".to_string()]).with_hour_column("hour")
}

#[test]
fn test_load_repairs_timestamps() {
    let file = create_hourly_csv();
    let series = SeriesLoader::from_csv(file.path(), &hourly_options()).unwrap();

    assert_eq!(series.len(), 4);
    assert!(!series.is_empty());

    // The date column lacks time of day; the hour column completes it
    let timestamps = series.timestamps();
    assert_eq!(
        timestamps,
        vec![
            "2016-07-01T00:00:00",
            "2016-07-01T01:00:00",
            "2016-07-01T02:00:00",
            "2016-07-01T03:00:00",
        ]
    );

    let values = series.target_values("consumption").unwrap();
    assert_eq!(values, vec![622.0, 598.0, 570.5, 561.0]);
}

#[test]
fn test_load_full_timestamps_without_hour_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,consumption").unwrap();
    writeln!(file, "2016-07-01T10:00:00,1.0").unwrap();
    writeln!(file, "2016-07-01T11:00:00,2.0").unwrap();

    let options = LoadOptions::new("date", vec!["consumption".to_string()]);
    let series = SeriesLoader::from_csv(file.path(), &options).unwrap();

    assert_eq!(
        series.timestamps(),
        vec!["2016-07-01T10:00:00", "2016-07-01T11:00:00"]
    );
}

#[test]
fn test_missing_columns_fail() {
    let file = create_hourly_csv();

    let options = LoadOptions::new("date", vec!["load".to_string()]).with_hour_column("hour");
    let result = SeriesLoader::from_csv(file.path(), &options);

    let error = result.unwrap_err();
    assert!(matches!(error, ForecastError::DataFormat(_)));
    assert!(error.to_string().contains("load"));
}

#[test]
fn test_missing_file_fails_with_io_error() {
    let result = SeriesLoader::from_csv("nonexistent_file.csv", &hourly_options());
    assert!(matches!(result.unwrap_err(), ForecastError::IoError(_)));
}

#[test]
fn test_forward_fill() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hour,consumption").unwrap();
    writeln!(file, "2016-07-01,0,622.0").unwrap();
    writeln!(file, "2016-07-01,1,").unwrap();
    writeln!(file, "2016-07-01,2,570.5").unwrap();

    let series = SeriesLoader::from_csv(file.path(), &hourly_options()).unwrap();

    // Default policy carries the previous value forward
    let values = series.target_values("consumption").unwrap();
    assert_eq!(values, vec![622.0, 622.0, 570.5]);
}

#[test]
fn test_zero_fill() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hour,consumption").unwrap();
    writeln!(file, "2016-07-01,0,").unwrap();
    writeln!(file, "2016-07-01,1,598.0").unwrap();

    let options = hourly_options().with_fill_policy(FillPolicy::Zero);
    let series = SeriesLoader::from_csv(file.path(), &options).unwrap();

    let values = series.target_values("consumption").unwrap();
    assert_eq!(values, vec![0.0, 598.0]);
}

#[test]
fn test_leading_null_forward_fill_uses_zero() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hour,consumption").unwrap();
    writeln!(file, "2016-07-01,0,").unwrap();
    writeln!(file, "2016-07-01,1,598.0").unwrap();

    let series = SeriesLoader::from_csv(file.path(), &hourly_options()).unwrap();

    let values = series.target_values("consumption").unwrap();
    assert_eq!(values, vec![0.0, 598.0]);
}

#[test]
fn test_reject_fill_policy() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hour,consumption").unwrap();
    writeln!(file, "2016-07-01,0,622.0").unwrap();
    writeln!(file, "2016-07-01,1,").unwrap();

    let options = hourly_options().with_fill_policy(FillPolicy::Reject);
    let result = SeriesLoader::from_csv(file.path(), &options);

    assert!(matches!(result.unwrap_err(), ForecastError::DataFormat(_)));
}

#[test]
fn test_duplicate_timestamps_fail() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hour,consumption").unwrap();
    writeln!(file, "2016-07-01,0,622.0").unwrap();
    writeln!(file, "2016-07-01,0,598.0").unwrap();

    let result = SeriesLoader::from_csv(file.path(), &hourly_options());
    assert!(matches!(result.unwrap_err(), ForecastError::DataFormat(_)));
}

#[test]
fn test_decreasing_timestamps_fail() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hour,consumption").unwrap();
    writeln!(file, "2016-07-01,5,622.0").unwrap();
    writeln!(file, "2016-07-01,2,598.0").unwrap();

    let result = SeriesLoader::from_csv(file.path(), &hourly_options());
    let error = result.unwrap_err();
    assert!(matches!(error, ForecastError::DataFormat(_)));
    assert!(error.to_string().contains("strictly increasing"));
}

#[test]
fn test_unparsable_date_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hour,consumption").unwrap();
    writeln!(file, "not-a-date,0,622.0").unwrap();

    let result = SeriesLoader::from_csv(file.path(), &hourly_options());
    assert!(matches!(result.unwrap_err(), ForecastError::DataFormat(_)));
}

#[test]
fn test_from_dataframe() {
    let df = DataFrame::new(vec![
        Series::new("date", vec!["2016-07-01", "2016-07-01"]),
        Series::new("hour", vec![3i64, 4]),
        Series::new("consumption", vec![1.5f64, 2.5]),
    ])
    .unwrap();

    let series = SeriesLoader::from_dataframe(df, &hourly_options()).unwrap();

    assert_eq!(
        series.timestamps(),
        vec!["2016-07-01T03:00:00", "2016-07-01T04:00:00"]
    );
    assert_eq!(series.target_columns(), ["consumption".to_string()]);
    assert_eq!(series.timestamp_column(), "timestamp");
}

#[test]
fn test_slice_preserves_rows() {
    let file = create_hourly_csv();
    let series = SeriesLoader::from_csv(file.path(), &hourly_options()).unwrap();

    let sliced = series.slice(1, 2);
    assert_eq!(sliced.len(), 2);
    assert_eq!(
        sliced.timestamps(),
        vec!["2016-07-01T01:00:00", "2016-07-01T02:00:00"]
    );
    assert_eq!(
        sliced.target_values("consumption").unwrap(),
        vec![598.0, 570.5]
    );
}

#[test]
fn test_custom_timestamp_column_name() {
    let file = create_hourly_csv();
    let options = hourly_options().with_timestamp_column("ds");
    let series = SeriesLoader::from_csv(file.path(), &options).unwrap();

    assert_eq!(series.timestamp_column(), "ds");
    assert!(series
        .dataframe()
        .get_column_names()
        .contains(&"ds"));
}
