use hosted_forecast::data::{LoadOptions, SeriesLoader};
use hosted_forecast::window::extract_windows;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Hosted Forecast: Windowing Example");
    println!("==================================\n");

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: windowing <csv-path> [offset...]");
            eprintln!("Expects columns: date, hour, consumption");
            return Ok(());
        }
    };

    let offsets: Vec<usize> = std::env::args()
        .skip(2)
        .map(|arg| arg.parse())
        .collect::<Result<_, _>>()?;
    let offsets = if offsets.is_empty() { vec![0] } else { offsets };

    // Load the series, completing the date column with the hour column
    let options = LoadOptions::new("date", vec!["consumption".to_string()])
        .with_hour_column("hour");
    let series = SeriesLoader::from_csv(&path, &options)?;
    println!("Loaded {} rows from {}", series.len(), path);

    let windows = extract_windows(&series, &offsets, 512, 20)?;
    println!("Extracted {} window pairs:\n", windows.len());

    for pair in windows.iter() {
        let context_timestamps = pair.context.timestamps()?;
        let future_timestamps = pair.future.timestamps()?;
        println!(
            "  {}: context {} .. {}, future {} .. {}",
            pair.context.id(),
            context_timestamps.first().unwrap(),
            context_timestamps.last().unwrap(),
            future_timestamps.first().unwrap(),
            future_timestamps.last().unwrap()
        );
    }

    Ok(())
}
