//! Descriptive statistics over the final series.
//!
//! This module consumes the pipeline output; it feeds nothing back into
//! the stage chain.

use serde::{Deserialize, Serialize};

use crate::series::Series;

/// Descriptive summary of a numeric column.
///
/// `std` is the population standard deviation (divides by n). Rows whose
/// value failed to parse as a number are excluded before anything is
/// computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    /// Summarize a slice of values. NaN entries are dropped; an input with
    /// no numeric data yields `None` rather than an error, since an empty
    /// summary is an expected state of the interactive session.
    pub fn describe(values: &[f64]) -> Option<Stats> {
        let mut numeric: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if numeric.is_empty() {
            return None;
        }
        numeric.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = numeric.len();
        let mean = numeric.iter().sum::<f64>() / count as f64;
        let variance = numeric.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Stats {
            count,
            mean,
            median: median_of_sorted(&numeric),
            std: variance.sqrt(),
            min: numeric[0],
            max: numeric[count - 1],
        })
    }

    /// Summarize the value column of a series.
    pub fn from_series(series: &Series) -> Option<Stats> {
        Stats::describe(&series.numeric_values())
    }
}

/// Median of an already-sorted, non-empty slice: average of the middle
/// pair for even lengths.
pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}
