//! Least-squares trend fitting and one-step extrapolation.

use super::stats::numeric_column;
use super::types::{AnalyticsError, TrendPrediction};

const MIN_POINTS: usize = 2;

/// Fit `y = intercept + slope·x` over `(1, v1) … (n, vn)` and predict the value at `n + 1`.
pub fn predict(series: &str, values: &[f64]) -> Result<TrendPrediction, AnalyticsError> {
    let n = values.len();
    if n < MIN_POINTS {
        return Err(AnalyticsError::InsufficientData {
            required: MIN_POINTS,
            actual: n,
        });
    }

    let x_mean = (n as f64 + 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let (covariance, x_spread) = values.iter().enumerate().fold(
        (0.0, 0.0),
        |(covariance, x_spread), (index, value)| {
            let dx = (index + 1) as f64 - x_mean;
            (covariance + dx * (value - y_mean), x_spread + dx * dx)
        },
    );

    let slope = covariance / x_spread;
    let intercept = y_mean - slope * x_mean;
    let x_next = n + 1;

    Ok(TrendPrediction {
        series: series.to_string(),
        last_value: values[n - 1],
        predicted_value: intercept + slope * x_next as f64,
        x_next,
        slope,
        intercept,
        points: n,
    })
}

/// Predict the next value of a tabular column.
///
/// With `column = None` the first header (in declared order) holding at least two parseable
/// values is used. Non-numeric cells are skipped and the remaining values keep their row order.
pub fn predict_from_table(
    headers: &[String],
    rows: &[Vec<String>],
    column: Option<&str>,
) -> Result<TrendPrediction, AnalyticsError> {
    if headers.is_empty() || rows.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    if let Some(name) = column {
        let index = headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| AnalyticsError::InvalidInput(format!("unknown column '{name}'")))?;
        return predict(name, &numeric_column(rows, index));
    }

    let mut best_available = 0;
    for (index, header) in headers.iter().enumerate() {
        let values = numeric_column(rows, index);
        if values.len() >= MIN_POINTS {
            tracing::debug!(column = %header, points = values.len(), "Selected trend column");
            return predict(header, &values);
        }
        best_available = best_available.max(values.len());
    }

    Err(AnalyticsError::InsufficientData {
        required: MIN_POINTS,
        actual: best_available,
    })
}
