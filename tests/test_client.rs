use hosted_forecast::client::{
    CredentialSource, Credentials, ForecastService, NaiveForecastService,
};
use hosted_forecast::error::ForecastError;
use hosted_forecast::request::{ForecastConfig, ForecastRow};
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn context_rows(id: &str, hours: usize, base: f64) -> Vec<ForecastRow> {
    (0..hours)
        .map(|i| {
            ForecastRow::single(
                id.to_string(),
                format!("2016-07-01T{:02}:00:00", i),
                "load".to_string(),
                base + i as f64,
            )
        })
        .collect()
}

fn hourly_config(prediction_length: usize) -> ForecastConfig {
    ForecastConfig::new(
        "unique_id",
        "timestamp",
        vec!["load".to_string()],
        "h",
        prediction_length,
    )
    .unwrap()
}

#[test]
fn test_stub_forecast_shape() {
    let mut rows = context_rows("id_0", 5, 100.0);
    rows.extend(context_rows("id_7", 5, 200.0));

    let service = NaiveForecastService::new();
    let forecast = service.forecast(&rows, &hourly_config(3)).unwrap();

    // One prediction per step per identifier
    assert_eq!(forecast.len(), 6);
    assert!(forecast[..3].iter().all(|row| row.id == "id_0"));
    assert!(forecast[3..].iter().all(|row| row.id == "id_7"));
}

#[test]
fn test_stub_forecast_continues_timestamps() {
    let rows = context_rows("id_0", 5, 100.0);

    let service = NaiveForecastService::new();
    let forecast = service.forecast(&rows, &hourly_config(3)).unwrap();

    // The context ends at 04:00; predictions step hourly from there
    let timestamps: Vec<&str> = forecast.iter().map(|row| row.timestamp.as_str()).collect();
    assert_eq!(
        timestamps,
        vec![
            "2016-07-01T05:00:00",
            "2016-07-01T06:00:00",
            "2016-07-01T07:00:00",
        ]
    );

    // Deterministic stub repeats the last observed value
    assert!(forecast.iter().all(|row| row.value("load") == Some(104.0)));
}

#[test]
fn test_stub_forecast_with_noise_stays_bounded() {
    let rows = context_rows("id_0", 5, 100.0);

    let service = NaiveForecastService::with_noise(2.0);
    let forecast = service.forecast(&rows, &hourly_config(10)).unwrap();

    for row in &forecast {
        let value = row.value("load").unwrap();
        assert!(value > 102.0 && value < 106.0);
    }
}

#[test]
fn test_stub_rejects_empty_context() {
    let service = NaiveForecastService::new();
    let result = service.forecast(&[], &hourly_config(3));
    assert!(matches!(result.unwrap_err(), ForecastError::Upstream(_)));
}

#[test]
fn test_credentials_from_env() {
    env::set_var("HF_TEST_ENV_API_KEY", "key-from-env");
    env::set_var("HF_TEST_ENV_BASE_URL", "https://forecast.example.com");

    let source = CredentialSource {
        env_prefix: "HF_TEST_ENV".to_string(),
        ..CredentialSource::default()
    };

    let credentials = Credentials::resolve(&source).unwrap();
    assert_eq!(credentials.api_key, "key-from-env");
    assert_eq!(credentials.base_url, "https://forecast.example.com");
    assert_eq!(credentials.project, None);

    env::remove_var("HF_TEST_ENV_API_KEY");
    env::remove_var("HF_TEST_ENV_BASE_URL");
}

#[test]
fn test_credentials_env_takes_precedence_over_file() {
    env::set_var("HF_TEST_PREC_API_KEY", "key-from-env");
    env::set_var("HF_TEST_PREC_BASE_URL", "https://env.example.com");

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"api_key": "key-from-file", "base_url": "https://file.example.com"}}"#
    )
    .unwrap();

    let source = CredentialSource {
        env_prefix: "HF_TEST_PREC".to_string(),
        credentials_file: Some(file.path().to_path_buf()),
        ..CredentialSource::default()
    };

    let credentials = Credentials::resolve(&source).unwrap();
    assert_eq!(credentials.api_key, "key-from-env");

    env::remove_var("HF_TEST_PREC_API_KEY");
    env::remove_var("HF_TEST_PREC_BASE_URL");
}

#[test]
fn test_credentials_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"api_key": "key-from-file", "base_url": "https://file.example.com", "project": "demo"}}"#
    )
    .unwrap();

    let source = CredentialSource {
        env_prefix: "HF_TEST_FILE".to_string(),
        credentials_file: Some(file.path().to_path_buf()),
        ..CredentialSource::default()
    };

    let credentials = Credentials::resolve(&source).unwrap();
    assert_eq!(credentials.api_key, "key-from-file");
    assert_eq!(credentials.base_url, "https://file.example.com");
    assert_eq!(credentials.project, Some("demo".to_string()));
}

#[test]
fn test_credentials_file_uses_default_base_url() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"api_key": "key-from-file"}}"#).unwrap();

    let source = CredentialSource {
        env_prefix: "HF_TEST_DEFAULT".to_string(),
        credentials_file: Some(file.path().to_path_buf()),
        default_base_url: Some("https://default.example.com".to_string()),
        ..CredentialSource::default()
    };

    let credentials = Credentials::resolve(&source).unwrap();
    assert_eq!(credentials.base_url, "https://default.example.com");
}

#[test]
fn test_credentials_missing_everywhere_fails() {
    let source = CredentialSource {
        env_prefix: "HF_TEST_MISSING".to_string(),
        ..CredentialSource::default()
    };

    let result = Credentials::resolve(&source);
    assert!(matches!(result.unwrap_err(), ForecastError::Credential(_)));
}

#[test]
fn test_credentials_invalid_file_fails() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let source = CredentialSource {
        env_prefix: "HF_TEST_BADFILE".to_string(),
        credentials_file: Some(file.path().to_path_buf()),
        ..CredentialSource::default()
    };

    let result = Credentials::resolve(&source);
    assert!(matches!(result.unwrap_err(), ForecastError::Credential(_)));
}
