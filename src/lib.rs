//! # Hosted Forecast
//!
//! A Rust library for preparing time series data for a remotely hosted
//! forecasting service and reconciling the service's output with ground
//! truth.
//!
//! ## Features
//!
//! - CSV time series loading with timestamp repair (date column plus
//!   hour-of-day column) and an explicit null-fill policy
//! - Context/future window extraction at arbitrary start offsets
//! - Validated forecast request configuration
//! - A narrow synchronous client for the hosted service, with an
//!   in-process stub for tests
//! - Alignment of forecast rows with ground-truth windows for comparison
//!   and rendering
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hosted_forecast::align::align;
//! use hosted_forecast::client::{ForecastService, NaiveForecastService};
//! use hosted_forecast::data::{LoadOptions, SeriesLoader};
//! use hosted_forecast::request::ForecastConfig;
//! use hosted_forecast::window::extract_windows;
//!
//! # fn main() -> hosted_forecast::Result<()> {
//! // Load an hourly series whose date column lacks time of day
//! let options = LoadOptions::new("date", vec!["consumption".to_string()])
//!     .with_hour_column("hour");
//! let series = SeriesLoader::from_csv("energy.csv", &options)?;
//!
//! // Slice paired context/future windows at two start offsets
//! let windows = extract_windows(&series, &[2173, 10635], 512, 20)?;
//!
//! // Describe the request and call the service (stubbed here)
//! let config = ForecastConfig::new(
//!     "unique_id",
//!     "timestamp",
//!     vec!["consumption".to_string()],
//!     "h",
//!     20,
//! )?;
//! let service = NaiveForecastService::new();
//! let forecast = service.forecast(&windows.context_rows()?, &config)?;
//!
//! // Reconcile predictions with ground truth for plotting
//! let aligned = align(&windows, &forecast, 128)?;
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod client;
pub mod data;
pub mod error;
pub mod metrics;
pub mod request;
pub mod utils;
pub mod window;

// Re-export commonly used types
pub use crate::align::{align, AlignedSeries};
pub use crate::client::{
    CredentialSource, Credentials, ForecastService, HttpForecastService, NaiveForecastService,
};
pub use crate::data::{FillPolicy, LoadOptions, SeriesData, SeriesLoader};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::{forecast_accuracy, ForecastAccuracy};
pub use crate::request::{ForecastConfig, ForecastRow};
pub use crate::window::{extract_windows, Window, WindowPair, WindowSet};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
