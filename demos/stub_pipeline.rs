use chrono::{Duration, NaiveDate};
use hosted_forecast::align::align;
use hosted_forecast::client::{
    CredentialSource, Credentials, ForecastService, HttpForecastService, NaiveForecastService,
};
use hosted_forecast::data::{LoadOptions, SeriesLoader};
use hosted_forecast::request::ForecastConfig;
use hosted_forecast::window::extract_windows;
use polars::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Hosted Forecast: Stub Pipeline Example");
    println!("======================================\n");

    // Create sample data
    println!("Creating sample hourly data...");
    let series = create_sample_series(2000)?;
    println!("Sample series created: {} hourly points\n", series.len());

    // Extract paired context/future windows at two start offsets
    println!("Extracting windows...");
    let windows = extract_windows(&series, &[400, 1200], 512, 20)?;
    for pair in windows.iter() {
        println!(
            "  {}: {} context rows, {} future rows",
            pair.context.id(),
            pair.context.len(),
            pair.future.len()
        );
    }
    println!();

    // Describe the forecast request
    let config = ForecastConfig::new(
        "unique_id",
        "timestamp",
        vec!["consumption".to_string()],
        "h",
        20,
    )?;

    // Use the hosted service when credentials are present, the in-process
    // stub otherwise
    let source = CredentialSource::default();
    let forecast = match Credentials::resolve(&source) {
        Ok(credentials) => {
            println!("Calling hosted service at {}...", credentials.base_url);
            let service =
                HttpForecastService::new(credentials, std::time::Duration::from_secs(30));
            service.forecast(&windows.context_rows()?, &config)?
        }
        Err(_) => {
            println!("No credentials found, using the in-process stub...");
            let service = NaiveForecastService::with_noise(5.0);
            service.forecast(&windows.context_rows()?, &config)?
        }
    };
    println!("Received {} predicted rows\n", forecast.len());

    // Reconcile predictions with ground truth
    let aligned = align(&windows, &forecast, 128)?;

    for (id, result) in &aligned {
        println!(
            "{}: {} ground-truth rows, {} predicted rows",
            id,
            result.truth.len(),
            result.predicted.len()
        );
        println!("{}", result.accuracy("consumption")?);
    }

    // Export one aligned pair for rendering
    let out_path = std::env::temp_dir().join("aligned_forecast.csv");
    let file = std::fs::File::create(&out_path)?;
    aligned
        .values()
        .next()
        .expect("at least one aligned identifier")
        .write_csv(file, "consumption")?;
    println!("Aligned series written to {}", out_path.display());

    Ok(())
}

// An hourly consumption-like series with a daily cycle and noise-free drift
fn create_sample_series(n: usize) -> hosted_forecast::Result<hosted_forecast::SeriesData> {
    let start = NaiveDate::from_ymd_opt(2016, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();

    let timestamps: Vec<String> = (0..n)
        .map(|i| {
            (start + Duration::hours(i as i64))
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string()
        })
        .collect();
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let hour = (i % 24) as f64;
            600.0 + 80.0 * (hour * std::f64::consts::PI / 12.0).sin() + i as f64 * 0.01
        })
        .collect();

    let df = DataFrame::new(vec![
        Series::new("date", timestamps),
        Series::new("consumption", values),
    ])?;

    SeriesLoader::from_dataframe(df, &LoadOptions::new("date", vec!["consumption".to_string()]))
}
