//! Local-average smoothing.

use serde::{Deserialize, Serialize};

use crate::series::Series;

/// Smoothing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingMethod {
    /// Trailing moving average over the last `window` points
    #[default]
    MovingAverage,
    /// Exponential smoothing with `α = 2 / (window + 1)`
    Exponential,
}

/// Smoothing stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub enabled: bool,
    pub method: SmoothingMethod,
    /// Window size; `1` is a no-op.
    pub window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            method: SmoothingMethod::MovingAverage,
            window: 1,
        }
    }
}

/// Replace each value with a local average. Length and timestamp order are
/// preserved; `window == 1` returns the input unchanged.
pub fn smooth(series: &Series, config: &SmoothingConfig) -> Series {
    if config.window <= 1 {
        return series.clone();
    }
    match config.method {
        SmoothingMethod::MovingAverage => moving_average(series, config.window),
        SmoothingMethod::Exponential => exponential(series, config.window),
    }
}

/// Trailing window `[max(0, i−w+1), i]`: early points average over fewer
/// samples rather than looking ahead. Missing values are skipped inside
/// the window; a window with no numeric data yields a missing value.
fn moving_average(series: &Series, window: usize) -> Series {
    let points = series.points();
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let start = (i + 1).saturating_sub(window);
            let samples: Vec<f64> = points[start..=i]
                .iter()
                .filter(|p| p.is_numeric())
                .filter_map(|p| p.value)
                .collect();
            let smoothed = if samples.is_empty() {
                None
            } else {
                Some(samples.iter().sum::<f64>() / samples.len() as f64)
            };
            point.with_value(smoothed)
        })
        .collect()
}

/// `smoothed[0] = raw[0]`, then `smoothed[i] = α·raw[i] + (1−α)·smoothed[i−1]`.
/// A missing raw value carries the previous smoothed value forward.
fn exponential(series: &Series, window: usize) -> Series {
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut previous: Option<f64> = None;
    series
        .iter()
        .map(|point| {
            let smoothed = match (point.value, previous) {
                (Some(raw), Some(prev)) if !raw.is_nan() => {
                    Some(alpha * raw + (1.0 - alpha) * prev)
                }
                (Some(raw), None) if !raw.is_nan() => Some(raw),
                (_, prev) => prev,
            };
            previous = smoothed;
            point.with_value(smoothed)
        })
        .collect()
}
