//! Context/future window extraction from a loaded series

use crate::data::{column_as_f64, utf8_column, SeriesData};
use crate::error::{ForecastError, Result};
use crate::request::ForecastRow;
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A contiguous, fixed-length slice of a series tagged with an identifier
#[derive(Debug, Clone)]
pub struct Window {
    id: String,
    frame: DataFrame,
    timestamp_column: String,
    target_columns: Vec<String>,
}

impl Window {
    /// Get the window identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the window rows as a DataFrame
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Get the number of rows in the window
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Get the window timestamps in row order
    pub fn timestamps(&self) -> Result<Vec<String>> {
        utf8_column(&self.frame, &self.timestamp_column)
    }

    /// Flatten the window into identifier-tagged rows, in row order
    pub fn rows(&self) -> Result<Vec<ForecastRow>> {
        let timestamps = self.timestamps()?;

        let mut columns = Vec::with_capacity(self.target_columns.len());
        for target in &self.target_columns {
            columns.push((target.clone(), column_as_f64(&self.frame, target)?));
        }

        let rows = timestamps
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| {
                let values: BTreeMap<String, f64> = columns
                    .iter()
                    .map(|(name, values)| (name.clone(), values[i]))
                    .collect();

                ForecastRow {
                    id: self.id.clone(),
                    timestamp,
                    values,
                }
            })
            .collect();

        Ok(rows)
    }
}

/// A (context, future) window pair drawn at one start offset
#[derive(Debug, Clone)]
pub struct WindowPair {
    /// Historical slice fed to the forecaster
    pub context: Window,
    /// Ground-truth slice immediately following the context
    pub future: Window,
}

/// Identifier-keyed window pairs, one per requested start offset
///
/// Lookup is by identifier; iteration and the combined request table
/// preserve the order the offsets were given in.
#[derive(Debug, Clone)]
pub struct WindowSet {
    pairs: HashMap<String, WindowPair>,
    order: Vec<String>,
}

impl WindowSet {
    /// Get the number of window pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Get the identifiers in offset order
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Look up a window pair by identifier
    pub fn get(&self, id: &str) -> Option<&WindowPair> {
        self.pairs.get(id)
    }

    /// Iterate the window pairs in offset order
    pub fn iter(&self) -> impl Iterator<Item = &WindowPair> {
        self.order.iter().map(|id| &self.pairs[id])
    }

    /// Flatten every context window into rows, in offset order
    pub fn context_rows(&self) -> Result<Vec<ForecastRow>> {
        let mut rows = Vec::new();
        for pair in self.iter() {
            rows.extend(pair.context.rows()?);
        }

        Ok(rows)
    }

    /// Flatten every future window into rows, in offset order
    pub fn future_rows(&self) -> Result<Vec<ForecastRow>> {
        let mut rows = Vec::new();
        for pair in self.iter() {
            rows.extend(pair.future.rows()?);
        }

        Ok(rows)
    }

    /// Build the combined context table, identifier column included
    pub fn context_frame(&self, id_column: &str) -> Result<DataFrame> {
        let mut combined: Option<DataFrame> = None;

        for pair in self.iter() {
            let mut frame = pair.context.frame.clone();
            let ids = vec![pair.context.id.clone(); frame.height()];
            frame.with_column(Series::new(id_column, ids))?;

            combined = Some(match combined {
                Some(acc) => acc.vstack(&frame)?,
                None => frame,
            });
        }

        combined.ok_or_else(|| ForecastError::Range("No windows extracted".to_string()))
    }
}

/// Extract (context, future) window pairs at the given start offsets
///
/// For each offset `o` the context window covers rows `[o, o + context_length)`
/// and the future window the `prediction_length` rows after it; both are
/// tagged `id_<o>`. Every offset must fit entirely inside the series.
pub fn extract_windows(
    series: &SeriesData,
    start_offsets: &[usize],
    context_length: usize,
    prediction_length: usize,
) -> Result<WindowSet> {
    if context_length == 0 || prediction_length == 0 {
        return Err(ForecastError::Config(
            "Context and prediction lengths must be positive".to_string(),
        ));
    }

    let mut pairs = HashMap::with_capacity(start_offsets.len());
    let mut order = Vec::with_capacity(start_offsets.len());
    let mut seen = HashSet::new();

    for &offset in start_offsets {
        let end = offset + context_length + prediction_length;
        if end > series.len() {
            return Err(ForecastError::Range(format!(
                "Start offset {} out of bounds: rows [{}, {}) requested but series has {}",
                offset,
                offset,
                end,
                series.len()
            )));
        }

        if !seen.insert(offset) {
            return Err(ForecastError::Range(format!(
                "Duplicate start offset {}",
                offset
            )));
        }

        let id = format!("id_{}", offset);
        let context = window_at(series, &id, offset, context_length);
        let future = window_at(series, &id, offset + context_length, prediction_length);

        pairs.insert(id.clone(), WindowPair { context, future });
        order.push(id);
    }

    Ok(WindowSet { pairs, order })
}

fn window_at(series: &SeriesData, id: &str, start: usize, length: usize) -> Window {
    Window {
        id: id.to_string(),
        frame: series.slice(start, length).dataframe().clone(),
        timestamp_column: series.timestamp_column().to_string(),
        target_columns: series.target_columns().to_vec(),
    }
}
