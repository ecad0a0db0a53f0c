//! Trend/seasonal decomposition with a trailing moving average.
//!
//! The trend at index `i` averages only points at indices `≤ i` — never a
//! symmetric window. That is what makes `trend[i] + seasonal[i] ==
//! value[i]` hold exactly, which a centered window would break; the
//! trailing convention is load-bearing, not an oversight.

use serde::{Deserialize, Serialize};

use crate::series::Series;

/// Decomposition stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    pub enabled: bool,
    /// Trailing window size, at least 2 and below the series length.
    pub window: usize,
    /// Keep the original value column and attach trend/seasonal as extra
    /// per-row fields instead of replacing the values with the trend.
    pub keep_components: bool,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window: 2,
            keep_components: false,
        }
    }
}

/// Split the series into trend and seasonal components.
///
/// The returned arrays are positionally aligned with the returned series
/// (same length, same order); positions with no numeric data are NaN.
/// Replace mode swaps the value column for the trend; keep-both mode
/// leaves it untouched and populates each row's `trend`/`seasonal` fields.
pub fn decompose(series: &Series, config: &DecompositionConfig) -> (Series, Vec<f64>, Vec<f64>) {
    let points = series.points();
    let mut trend = Vec::with_capacity(points.len());
    let mut seasonal = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        let start = (i + 1).saturating_sub(config.window);
        let samples: Vec<f64> = points[start..=i]
            .iter()
            .filter(|p| p.is_numeric())
            .filter_map(|p| p.value)
            .collect();
        let t = if samples.is_empty() {
            f64::NAN
        } else {
            samples.iter().sum::<f64>() / samples.len() as f64
        };
        let s = match point.value {
            Some(v) => v - t,
            None => f64::NAN,
        };
        trend.push(t);
        seasonal.push(s);
    }

    let out = if config.keep_components {
        points
            .iter()
            .zip(trend.iter().zip(seasonal.iter()))
            .map(|(point, (&t, &s))| {
                let mut point = point.clone();
                point.trend = (!t.is_nan()).then_some(t);
                point.seasonal = (!s.is_nan()).then_some(s);
                point
            })
            .collect()
    } else {
        points
            .iter()
            .zip(trend.iter())
            .map(|(point, &t)| point.with_value((!t.is_nan()).then_some(t)))
            .collect()
    };

    (out, trend, seasonal)
}
