//! Reconciliation of forecast output with ground-truth windows

use crate::error::{ForecastError, Result};
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use crate::request::ForecastRow;
use crate::window::WindowSet;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use tracing::warn;

/// Ground truth and prediction for one identifier, both ascending by timestamp
///
/// The ground-truth series is the tail of the context window followed by the
/// full future window; the predicted series is the forecast rows. Ephemeral,
/// built per comparison or plot.
#[derive(Debug, Clone)]
pub struct AlignedSeries {
    /// Window identifier
    pub id: String,
    /// Last `history_length` context rows plus the future window
    pub truth: Vec<ForecastRow>,
    /// Forecast rows for the identifier
    pub predicted: Vec<ForecastRow>,
}

impl AlignedSeries {
    /// Accuracy of the prediction against the ground truth for one target,
    /// computed over timestamps present on both sides
    pub fn accuracy(&self, target: &str) -> Result<ForecastAccuracy> {
        let truth_by_timestamp: HashMap<&str, &ForecastRow> = self
            .truth
            .iter()
            .map(|row| (row.timestamp.as_str(), row))
            .collect();

        let mut predicted = Vec::new();
        let mut actual = Vec::new();
        for row in &self.predicted {
            if let Some(truth_row) = truth_by_timestamp.get(row.timestamp.as_str()) {
                match (row.value(target), truth_row.value(target)) {
                    (Some(p), Some(a)) => {
                        predicted.push(p);
                        actual.push(a);
                    }
                    _ => {
                        return Err(ForecastError::Config(format!(
                            "Target '{}' missing from aligned rows",
                            target
                        )))
                    }
                }
            }
        }

        forecast_accuracy(&predicted, &actual)
    }

    /// Write the aligned pair as long-format CSV rows for a rendering target
    pub fn write_csv<W: io::Write>(&self, writer: W, target: &str) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["id", "timestamp", "series", target])?;

        for (label, rows) in [("actual", &self.truth), ("predicted", &self.predicted)] {
            for row in rows {
                let value = row
                    .value(target)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                csv_writer.write_record([
                    self.id.as_str(),
                    row.timestamp.as_str(),
                    label,
                    value.as_str(),
                ])?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Merge forecast rows with the ground-truth windows they answer
///
/// Identifiers present in only one of the two sides are dropped with a
/// warning so partial responses stay inspectable. A forecast whose
/// timestamps are disjoint from the expected future window indicates a
/// mismatched request/response and fails.
pub fn align(
    windows: &WindowSet,
    forecast: &[ForecastRow],
    history_length: usize,
) -> Result<BTreeMap<String, AlignedSeries>> {
    let mut by_id: HashMap<&str, Vec<ForecastRow>> = HashMap::new();
    for row in forecast {
        by_id.entry(row.id.as_str()).or_default().push(row.clone());
    }

    for id in by_id.keys() {
        if windows.get(id).is_none() {
            warn!(id = %id, "forecast identifier not present in request windows, dropping");
        }
    }

    let mut aligned = BTreeMap::new();

    for id in windows.ids() {
        let pair = windows.get(id).expect("window set ids are its keys");

        let mut predicted = match by_id.remove(id.as_str()) {
            Some(rows) => rows,
            None => {
                warn!(id = id.as_str(), "no forecast rows for identifier, dropping");
                continue;
            }
        };

        let future_rows = pair.future.rows()?;
        let expected: HashSet<&str> = future_rows
            .iter()
            .map(|row| row.timestamp.as_str())
            .collect();

        if !predicted
            .iter()
            .any(|row| expected.contains(row.timestamp.as_str()))
        {
            return Err(ForecastError::Alignment(format!(
                "Identifier '{}': forecast timestamps are disjoint from the expected future window",
                id
            )));
        }

        let context_rows = pair.context.rows()?;
        let tail_start = context_rows.len().saturating_sub(history_length);

        let mut truth: Vec<ForecastRow> = context_rows[tail_start..].to_vec();
        truth.extend(future_rows);
        truth.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        predicted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        aligned.insert(
            id.clone(),
            AlignedSeries {
                id: id.clone(),
                truth,
                predicted,
            },
        );
    }

    Ok(aligned)
}
