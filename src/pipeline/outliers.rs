//! Outlier filtering with classical and robust spread estimates.

use serde::{Deserialize, Serialize};

use crate::series::Series;
use crate::stats::median_of_sorted;

/// Outlier detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Distance from the mean in population standard deviations
    #[default]
    #[serde(rename = "std")]
    StdDev,
    /// Distance from the median in median absolute deviations
    Mad,
}

/// Outlier stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub enabled: bool,
    pub method: OutlierMethod,
    /// Multiplier on the spread estimate, typically 1–5.
    pub threshold: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            method: OutlierMethod::StdDev,
            threshold: 2.0,
        }
    }
}

/// Drop rows whose value lies further than `threshold × spread` from the
/// center. Rows without a numeric value cannot be judged and are retained.
///
/// A zero spread (constant series) keeps every row; no division happens.
/// Filtering may punch holes in the timestamp grid built by the imputer,
/// which later stages tolerate.
pub fn filter(series: &Series, config: &OutlierConfig) -> Series {
    let numeric = series.numeric_values();
    if numeric.is_empty() {
        return series.clone();
    }

    let (center, spread) = match config.method {
        OutlierMethod::StdDev => {
            let mean = numeric.iter().sum::<f64>() / numeric.len() as f64;
            let variance =
                numeric.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / numeric.len() as f64;
            (mean, variance.sqrt())
        }
        OutlierMethod::Mad => {
            let mut sorted = numeric.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let median = median_of_sorted(&sorted);
            let mut deviations: Vec<f64> = numeric.iter().map(|v| (v - median).abs()).collect();
            deviations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            (median, median_of_sorted(&deviations))
        }
    };

    if spread == 0.0 || !spread.is_finite() {
        return series.clone();
    }

    series
        .iter()
        .filter(|point| match point.value {
            Some(v) if !v.is_nan() => (v - center).abs() <= config.threshold * spread,
            _ => true,
        })
        .cloned()
        .collect()
}
