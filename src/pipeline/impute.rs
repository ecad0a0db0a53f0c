//! Date-frequency normalization and gap filling.
//!
//! Rebuilds the series onto a complete timestamp grid at the configured
//! frequency, then fills the missing values. After this stage the
//! timestamps are strictly ascending with no duplicates and no gaps.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::series::{Series, TimePoint};
use crate::temporal::Frequency;

/// How synthesized gaps (and pre-existing missing values) are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// Interpolate proportionally by grid-index distance between the
    /// nearest numeric neighbors
    #[default]
    Linear,
    /// Propagate the nearest earlier value
    #[serde(rename = "ffill")]
    ForwardFill,
    /// Propagate the nearest later value
    #[serde(rename = "bfill")]
    BackwardFill,
    /// Replace with a configured constant
    Constant,
}

/// Imputation stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImputationConfig {
    pub enabled: bool,
    pub frequency: Frequency,
    pub method: FillMethod,
    /// Fill value for [`FillMethod::Constant`]; ignored otherwise.
    pub constant: f64,
}

impl Default for ImputationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: Frequency::Daily,
            method: FillMethod::Linear,
            constant: 0.0,
        }
    }
}

/// Rebuild the series on a gap-free grid and fill missing values.
///
/// Rows without a parseable timestamp cannot be placed on the grid and are
/// dropped. Duplicate calendar dates keep the last row seen, matching the
/// keyed-lookup behavior of the upstream service. Empty input produces
/// empty output.
pub fn impute(series: &Series, config: &ImputationConfig) -> Series {
    let sorted = series.sorted_by_timestamp();
    let dated: Vec<&TimePoint> = sorted.iter().filter(|p| p.timestamp.is_some()).collect();
    let dropped = sorted.len() - dated.len();
    if dropped > 0 {
        warn!(
            "imputation: dropping {} row(s) without a parseable timestamp",
            dropped
        );
    }
    if dated.is_empty() {
        return Series::default();
    }

    let mut by_date: BTreeMap<NaiveDate, TimePoint> = BTreeMap::new();
    for point in &dated {
        if let Some(date) = point.timestamp {
            by_date.insert(date, (*point).clone());
        }
    }
    let (first, last) = match (by_date.keys().next(), by_date.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Series::default(),
    };

    let mut grid = Vec::new();
    let mut current = config.frequency.snap_first(first);
    while current <= last {
        let point = by_date
            .get(&current)
            .cloned()
            .unwrap_or_else(|| TimePoint::new(Some(current), None));
        grid.push(point);
        let next = config.frequency.advance(current);
        if next <= current {
            break; // stalled grid, calendar arithmetic hit a boundary
        }
        current = next;
    }

    fill(&mut grid, config);
    Series::from_points(grid)
}

fn fill(points: &mut [TimePoint], config: &ImputationConfig) {
    match config.method {
        FillMethod::Linear => fill_linear(points),
        FillMethod::ForwardFill => {
            let mut previous = None;
            for point in points.iter_mut() {
                match point.value {
                    Some(v) => previous = Some(v),
                    None => point.value = previous,
                }
            }
        }
        FillMethod::BackwardFill => {
            let mut next = None;
            for point in points.iter_mut().rev() {
                match point.value {
                    Some(v) => next = Some(v),
                    None => point.value = next,
                }
            }
        }
        FillMethod::Constant => {
            for point in points.iter_mut() {
                if point.value.is_none() {
                    point.value = Some(config.constant);
                }
            }
        }
    }
}

/// Interpolate each gap between its nearest present neighbors,
/// proportionally by grid-index distance. A gap with only one side copies
/// that side; a gap with neither side stays missing (all-missing input).
fn fill_linear(points: &mut [TimePoint]) {
    for i in 0..points.len() {
        if points[i].value.is_some() {
            continue;
        }
        let before = points[..i]
            .iter()
            .rposition(|p| p.value.is_some())
            .map(|j| (j, points[j].value.unwrap_or_default()));
        let after = points[i + 1..]
            .iter()
            .position(|p| p.value.is_some())
            .map(|offset| {
                let j = i + 1 + offset;
                (j, points[j].value.unwrap_or_default())
            });

        points[i].value = match (before, after) {
            (Some((pi, pv)), Some((ni, nv))) => {
                let ratio = (i - pi) as f64 / (ni - pi) as f64;
                Some(pv + (nv - pv) * ratio)
            }
            (Some((_, pv)), None) => Some(pv),
            (None, Some((_, nv))) => Some(nv),
            (None, None) => None,
        };
    }
}
