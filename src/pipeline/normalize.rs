//! Min-max normalization of the value column.

use serde::{Deserialize, Serialize};

use crate::series::Series;

/// Normalization stage configuration. The stage has no parameters beyond
/// its toggle; the target range is always `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub enabled: bool,
}

/// Scale the value column to `[0, 1]`.
///
/// `min`/`max` are taken over the finite values of the series. Zero-range
/// policy: a constant series maps every value to `0.0` — the degenerate
/// range is never used as a divisor. Non-finite values stay non-finite.
pub fn normalize(series: &Series) -> Series {
    let finite: Vec<f64> = series
        .numeric_values()
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if finite.is_empty() {
        return series.clone();
    }

    let range = max - min;
    series
        .iter()
        .map(|point| {
            let scaled = point.value.map(|v| {
                if range == 0.0 {
                    0.0
                } else {
                    (v - min) / range
                }
            });
            point.with_value(scaled)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TimePoint;

    fn series_of(values: &[f64]) -> Series {
        values
            .iter()
            .map(|&v| TimePoint::new(None, Some(v)))
            .collect()
    }

    #[test]
    fn test_bounds_and_extremes() {
        let series = series_of(&[5.0, 10.0, 7.5, 0.0]);
        let out = normalize(&series);
        let values = out.numeric_values();
        assert_eq!(values[3], 0.0); // original minimum
        assert_eq!(values[1], 1.0); // original maximum
        for v in &values {
            assert!((0.0..=1.0).contains(v));
        }
    }

    #[test]
    fn test_idempotent_on_unit_range() {
        let series = series_of(&[0.0, 0.25, 1.0]);
        let once = normalize(&series);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_constant_series_maps_to_zero() {
        let series = series_of(&[3.0, 3.0, 3.0]);
        let out = normalize(&series);
        assert_eq!(out.numeric_values(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_values_stay_missing() {
        let series = Series::from_points(vec![
            TimePoint::new(None, Some(1.0)),
            TimePoint::new(None, None),
            TimePoint::new(None, Some(3.0)),
        ]);
        let out = normalize(&series);
        assert!(out.get(1).unwrap().value.is_none());
        assert_eq!(out.get(0).unwrap().value, Some(0.0));
        assert_eq!(out.get(2).unwrap().value, Some(1.0));
    }

    #[test]
    fn test_empty_series_passes_through() {
        assert!(normalize(&Series::default()).is_empty());
    }
}
