//! Descriptive statistics over tabular rows.

use serde::Serialize;

use super::types::{AnalyticsError, NumericColumnStats};

/// Per-column statistics for one dataset, in header order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// Number of data rows scanned.
    pub rows: usize,
    /// Numeric columns; columns without any parseable value are omitted.
    pub columns: Vec<NumericColumnStats>,
}

impl DatasetSummary {
    /// Look up the statistics of a column by header name.
    pub fn column(&self, field: &str) -> Option<&NumericColumnStats> {
        self.columns.iter().find(|stats| stats.field == field)
    }
}

/// Parse a cell as a finite number. Anything else is excluded from statistics, never an error.
pub(crate) fn parse_numeric(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Values of column `index` that parse as numbers, in row order.
pub(crate) fn numeric_column(rows: &[Vec<String>], index: usize) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| row.get(index))
        .filter_map(|cell| parse_numeric(cell))
        .collect()
}

/// Compute count, mean, population standard deviation, min and max for every numeric column.
pub fn describe(
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<DatasetSummary, AnalyticsError> {
    if headers.is_empty() || rows.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let columns = headers
        .iter()
        .enumerate()
        .filter_map(|(index, field)| column_stats(field, &numeric_column(rows, index)))
        .collect::<Vec<_>>();

    tracing::debug!(
        rows = rows.len(),
        headers = headers.len(),
        numeric_columns = columns.len(),
        "Described dataset"
    );

    Ok(DatasetSummary {
        rows: rows.len(),
        columns,
    })
}

fn column_stats(field: &str, values: &[f64]) -> Option<NumericColumnStats> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(NumericColumnStats {
        field: field.to_string(),
        count,
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    })
}
