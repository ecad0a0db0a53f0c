//! Variance-stabilizing and differencing transforms.
//!
//! Exactly one transform is active per run. Out-of-domain input produces
//! non-finite values rather than errors: `ln(0)` is `-inf`, `sqrt(-1)` is
//! NaN, and both flow downstream for the caller to chart or filter.

use serde::{Deserialize, Serialize};

use crate::series::Series;

/// Transform selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    /// No-op
    #[default]
    None,
    /// Natural logarithm
    Log,
    /// First difference; drops the first row
    Difference,
    /// Square root
    Sqrt,
    /// Box-Cox power transform; non-positive values pass through unchanged
    BoxCox,
    /// Box-Cox followed by first difference; drops the first row
    Stationary,
}

/// Transform stage configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub enabled: bool,
    pub kind: TransformKind,
    /// Box-Cox λ; `None` means 0 (the log branch).
    pub lambda: Option<f64>,
}

/// Apply the configured transform to the value column.
pub fn apply(series: &Series, config: &TransformConfig) -> Series {
    let lambda = config.lambda.unwrap_or(0.0);
    match config.kind {
        TransformKind::None => series.clone(),
        TransformKind::Log => map_values(series, f64::ln),
        TransformKind::Sqrt => map_values(series, f64::sqrt),
        TransformKind::Difference => difference(series),
        TransformKind::BoxCox => map_values(series, |v| {
            // Deliberate leniency: rows Box-Cox cannot handle keep their
            // original value instead of failing the run.
            if v > 0.0 {
                box_cox(v, lambda)
            } else {
                v
            }
        }),
        TransformKind::Stationary => {
            let stabilized = map_values(series, |v| {
                if v > 0.0 {
                    box_cox(v, lambda)
                } else {
                    f64::NAN
                }
            });
            difference(&stabilized)
        }
    }
}

fn box_cox(value: f64, lambda: f64) -> f64 {
    if lambda == 0.0 {
        value.ln()
    } else {
        (value.powf(lambda) - 1.0) / lambda
    }
}

fn map_values(series: &Series, f: impl Fn(f64) -> f64) -> Series {
    series
        .iter()
        .map(|point| point.with_value(point.value.map(&f)))
        .collect()
}

/// `value[i] − value[i−1]`; the first row has no predecessor and is
/// dropped, so output length is input length − 1. A difference with a
/// missing neighbor is missing.
fn difference(series: &Series) -> Series {
    let points = series.points();
    points
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, point)| {
            let diff = match (point.value, points[i - 1].value) {
                (Some(current), Some(previous)) => Some(current - previous),
                _ => None,
            };
            point.with_value(diff)
        })
        .collect()
}
