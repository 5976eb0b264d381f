//! Remote forecasting service boundary
//!
//! The hosted service is treated as an opaque function from context rows and
//! a configuration to predicted rows. The [`ForecastService`] trait keeps
//! that boundary narrow so the pipeline can run against a stub in tests.

use crate::error::{ForecastError, Result};
use crate::request::{ForecastConfig, ForecastRow};
use crate::utils::{format_timestamp, future_timestamps, parse_timestamp};
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Narrow interface to a forecasting service
///
/// One synchronous call: context rows and a configuration in, predicted rows
/// out. Failures surface as typed errors and are never retried here.
pub trait ForecastService {
    /// Request `config.prediction_length()` predicted steps per identifier
    fn forecast(&self, rows: &[ForecastRow], config: &ForecastConfig) -> Result<Vec<ForecastRow>>;
}

/// Resolved credentials for the hosted service
#[derive(Debug, Clone)]
pub struct Credentials {
    /// API key sent as a bearer token
    pub api_key: String,
    /// Service base URL
    pub base_url: String,
    /// Optional project identifier
    pub project: Option<String>,
}

/// Where and how to look for credentials, in precedence order:
/// environment variables, then a JSON credentials file, then an
/// interactive prompt. Resolution is explicit and injected at startup so
/// the pipeline itself never reads ambient state.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    /// Prefix for `<PREFIX>_API_KEY`, `<PREFIX>_BASE_URL`, `<PREFIX>_PROJECT`
    pub env_prefix: String,
    /// Optional JSON file with `api_key`, `base_url`, `project` fields
    pub credentials_file: Option<PathBuf>,
    /// Whether to fall back to prompting on the terminal
    pub allow_prompt: bool,
    /// Base URL used when the winning source does not carry one
    pub default_base_url: Option<String>,
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self {
            env_prefix: "FORECAST".to_string(),
            credentials_file: None,
            allow_prompt: false,
            default_base_url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileCredentials {
    api_key: String,
    base_url: Option<String>,
    project: Option<String>,
}

impl Credentials {
    /// Resolve credentials from the configured sources
    pub fn resolve(source: &CredentialSource) -> Result<Self> {
        if let Some(credentials) = Self::from_env(source)? {
            debug!("credentials resolved from environment");
            return Ok(credentials);
        }

        if let Some(path) = &source.credentials_file {
            if path.exists() {
                debug!(path = %path.display(), "credentials resolved from file");
                return Self::from_file(path, source);
            }
        }

        if source.allow_prompt {
            return Self::from_prompt(source);
        }

        Err(ForecastError::Credential(format!(
            "No credentials found: set {}_API_KEY or provide a credentials file",
            source.env_prefix
        )))
    }

    fn from_env(source: &CredentialSource) -> Result<Option<Self>> {
        let api_key = match env::var(format!("{}_API_KEY", source.env_prefix)) {
            Ok(key) => key,
            Err(_) => return Ok(None),
        };

        let base_url = env::var(format!("{}_BASE_URL", source.env_prefix))
            .ok()
            .or_else(|| source.default_base_url.clone())
            .ok_or_else(|| {
                ForecastError::Credential(format!(
                    "{}_API_KEY is set but no base URL is available",
                    source.env_prefix
                ))
            })?;

        Ok(Some(Self {
            api_key,
            base_url,
            project: env::var(format!("{}_PROJECT", source.env_prefix)).ok(),
        }))
    }

    fn from_file(path: &PathBuf, source: &CredentialSource) -> Result<Self> {
        let file = File::open(path)?;
        let parsed: FileCredentials = serde_json::from_reader(file).map_err(|e| {
            ForecastError::Credential(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        let base_url = parsed
            .base_url
            .or_else(|| source.default_base_url.clone())
            .ok_or_else(|| {
                ForecastError::Credential(format!(
                    "Credentials file {} has no base_url",
                    path.display()
                ))
            })?;

        Ok(Self {
            api_key: parsed.api_key,
            base_url,
            project: parsed.project,
        })
    }

    fn from_prompt(source: &CredentialSource) -> Result<Self> {
        let base_url = source.default_base_url.clone().ok_or_else(|| {
            ForecastError::Credential(
                "Interactive prompt needs a default base URL".to_string(),
            )
        })?;

        eprint!("Forecast service API key: ");
        io::stderr().flush()?;

        let mut api_key = String::new();
        io::stdin().lock().read_line(&mut api_key)?;
        let api_key = api_key.trim().to_string();

        if api_key.is_empty() {
            return Err(ForecastError::Credential("Empty API key".to_string()));
        }

        Ok(Self {
            api_key,
            base_url,
            project: None,
        })
    }
}

/// HTTP client for the hosted forecasting service
///
/// Synchronous, one request per forecast run, bounded by the caller-supplied
/// timeout. A timeout surfaces as [`ForecastError::UpstreamTimeout`] and is
/// not retried: the service offers no idempotency keys.
#[derive(Debug)]
pub struct HttpForecastService {
    agent: ureq::Agent,
    credentials: Credentials,
}

impl HttpForecastService {
    /// Create a client with the given credentials and request timeout
    pub fn new(credentials: Credentials, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        Self { agent, credentials }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/forecast",
            self.credentials.base_url.trim_end_matches('/')
        )
    }
}

impl ForecastService for HttpForecastService {
    fn forecast(&self, rows: &[ForecastRow], config: &ForecastConfig) -> Result<Vec<ForecastRow>> {
        let payload = request_payload(rows, config);
        let url = self.endpoint();

        debug!(
            url = %url,
            rows = rows.len(),
            horizon = config.prediction_length(),
            "dispatching forecast request"
        );

        let mut request = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.credentials.api_key));
        if let Some(project) = &self.credentials.project {
            request = request.set("X-Project", project);
        }

        match request.send_json(payload) {
            Ok(response) => {
                let body: Value = response
                    .into_json()
                    .map_err(|e| ForecastError::Upstream(format!("Invalid response body: {}", e)))?;
                parse_response(&body, config)
            }
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(ForecastError::Upstream(format!(
                    "Service returned status {}: {}",
                    code, body
                )))
            }
            Err(ureq::Error::Transport(transport)) => {
                let message = transport.to_string();
                if message.contains("timed out") || message.contains("timeout") {
                    Err(ForecastError::UpstreamTimeout(message))
                } else {
                    Err(ForecastError::Upstream(message))
                }
            }
        }
    }
}

/// Build the JSON request body: the configuration plus one object per row,
/// keyed by the configured column names
fn request_payload(rows: &[ForecastRow], config: &ForecastConfig) -> Value {
    let rows_json: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            object.insert(
                config.id_column().to_string(),
                Value::String(row.id.clone()),
            );
            object.insert(
                config.timestamp_column().to_string(),
                Value::String(row.timestamp.clone()),
            );
            for (name, value) in &row.values {
                object.insert(name.clone(), json!(value));
            }
            Value::Object(object)
        })
        .collect();

    json!({ "config": config, "rows": rows_json })
}

/// Parse the response body back into rows, keyed by the configured columns
fn parse_response(body: &Value, config: &ForecastConfig) -> Result<Vec<ForecastRow>> {
    let rows = body
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| ForecastError::Upstream("Response has no 'rows' array".to_string()))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let id = row
                .get(config.id_column())
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ForecastError::Upstream(format!(
                        "Response row {} is missing '{}'",
                        i,
                        config.id_column()
                    ))
                })?;
            let timestamp = row
                .get(config.timestamp_column())
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ForecastError::Upstream(format!(
                        "Response row {} is missing '{}'",
                        i,
                        config.timestamp_column()
                    ))
                })?;

            let mut values = BTreeMap::new();
            for target in config.target_columns() {
                let value = row.get(target).and_then(Value::as_f64).ok_or_else(|| {
                    ForecastError::Upstream(format!(
                        "Response row {} is missing target '{}'",
                        i, target
                    ))
                })?;
                values.insert(target.clone(), value);
            }

            Ok(ForecastRow {
                id: id.to_string(),
                timestamp: timestamp.to_string(),
                values,
            })
        })
        .collect()
}

/// In-process stand-in for the hosted service
///
/// Repeats each identifier's last observed context values across the
/// requested horizon, timestamps stepped by the configured frequency, with
/// optional uniform noise. Used by the tests and demos.
#[derive(Debug, Clone)]
pub struct NaiveForecastService {
    noise: f64,
}

impl NaiveForecastService {
    /// Create a deterministic stub
    pub fn new() -> Self {
        Self { noise: 0.0 }
    }

    /// Create a stub adding uniform noise in `(-noise, noise)` to each value
    pub fn with_noise(noise: f64) -> Self {
        Self { noise }
    }
}

impl Default for NaiveForecastService {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastService for NaiveForecastService {
    fn forecast(&self, rows: &[ForecastRow], config: &ForecastConfig) -> Result<Vec<ForecastRow>> {
        if rows.is_empty() {
            return Err(ForecastError::Upstream(
                "Empty context rows".to_string(),
            ));
        }

        // Last context row per identifier, first-seen order preserved
        let mut order = Vec::new();
        let mut last_rows: HashMap<&str, &ForecastRow> = HashMap::new();
        for row in rows {
            if !last_rows.contains_key(row.id.as_str()) {
                order.push(row.id.clone());
            }
            last_rows.insert(row.id.as_str(), row);
        }

        let mut rng = rand::thread_rng();
        let mut predictions = Vec::with_capacity(order.len() * config.prediction_length());

        for id in order {
            let last = last_rows[id.as_str()];
            let last_instant = parse_timestamp(&last.timestamp)?;
            let steps =
                future_timestamps(last_instant, config.prediction_length(), config.frequency())?;

            for instant in steps {
                let values: BTreeMap<String, f64> = last
                    .values
                    .iter()
                    .map(|(name, value)| {
                        let jitter = if self.noise > 0.0 {
                            rng.gen_range(-self.noise..self.noise)
                        } else {
                            0.0
                        };
                        (name.clone(), value + jitter)
                    })
                    .collect();

                predictions.push(ForecastRow {
                    id: id.clone(),
                    timestamp: format_timestamp(instant),
                    values,
                });
            }
        }

        Ok(predictions)
    }
}
