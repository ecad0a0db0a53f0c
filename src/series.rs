//! Series construction and date/value coercion.
//!
//! Raw rows arrive as column→value maps (the shape a CSV/XLSX upload is
//! ingested into). Coercion marks corruption instead of failing: a
//! timestamp that does not parse or a value that is not numeric becomes
//! `None` in the typed field, and later stages decide the fallback policy.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw input row: column name → JSON value.
pub type RawRow = serde_json::Map<String, Value>;

/// One observation of the series.
///
/// `extra` carries every column other than the designated timestamp and
/// value columns through all stages unchanged. `trend` and `seasonal` are
/// populated only by keep-both decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: Option<NaiveDate>,
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal: Option<f64>,
}

impl TimePoint {
    /// Create a point with no pass-through columns.
    pub fn new(timestamp: Option<NaiveDate>, value: Option<f64>) -> Self {
        Self {
            timestamp,
            value,
            extra: BTreeMap::new(),
            trend: None,
            seasonal: None,
        }
    }

    /// A copy of this point with a different value.
    pub fn with_value(&self, value: Option<f64>) -> Self {
        let mut point = self.clone();
        point.value = value;
        point
    }

    /// True if the value is present and not NaN.
    ///
    /// Infinities count as numeric: the transformer deliberately produces
    /// them for out-of-domain input and they flow through downstream
    /// arithmetic rather than being re-marked as missing.
    pub fn is_numeric(&self) -> bool {
        matches!(self.value, Some(v) if !v.is_nan())
    }

    /// Rebuild the raw-row representation of this point.
    pub fn to_row(&self, date_column: &str, value_column: &str) -> RawRow {
        let mut row = RawRow::new();
        let date = match self.timestamp {
            Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            None => Value::Null,
        };
        row.insert(date_column.to_string(), date);
        row.insert(value_column.to_string(), number_or_null(self.value));
        for (name, cell) in &self.extra {
            row.insert(name.clone(), cell.clone());
        }
        if self.trend.is_some() {
            row.insert("trend".to_string(), number_or_null(self.trend));
        }
        if self.seasonal.is_some() {
            row.insert("seasonal".to_string(), number_or_null(self.seasonal));
        }
        row
    }
}

fn number_or_null(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// An ordered sequence of time points.
///
/// Order reflects upstream sort order until the imputer runs; after the
/// imputer, timestamps form a contiguous grid at the configured frequency
/// with no duplicates and no gaps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    points: Vec<TimePoint>,
}

impl Series {
    /// Coerce raw rows into a series.
    ///
    /// Does not sort; sorting is each downstream stage's responsibility
    /// where relevant. Missing columns coerce to `None` like unparseable
    /// cells do.
    pub fn from_rows(rows: &[RawRow], date_column: &str, value_column: &str) -> Self {
        let points = rows
            .iter()
            .map(|row| {
                let timestamp = row.get(date_column).and_then(parse_date);
                let value = row.get(value_column).and_then(parse_value);
                let extra = row
                    .iter()
                    .filter(|(name, _)| {
                        name.as_str() != date_column && name.as_str() != value_column
                    })
                    .map(|(name, cell)| (name.clone(), cell.clone()))
                    .collect();
                TimePoint {
                    timestamp,
                    value,
                    extra,
                    trend: None,
                    seasonal: None,
                }
            })
            .collect();
        Self { points }
    }

    pub fn from_points(points: Vec<TimePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimePoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimePoint> {
        self.points.iter()
    }

    /// The value column, preserving missing entries.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// The numeric values of the series, in order.
    ///
    /// This is the array handed to the statistical-test collaborator and
    /// the input to every stage's summary statistics. NaN markers are
    /// excluded; infinities are kept.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.points
            .iter()
            .filter(|p| p.is_numeric())
            .filter_map(|p| p.value)
            .collect()
    }

    /// A copy sorted by timestamp ascending (stable; points without a
    /// timestamp sort last).
    pub fn sorted_by_timestamp(&self) -> Self {
        let mut points = self.points.clone();
        points.sort_by_key(|p| (p.timestamp.is_none(), p.timestamp));
        Self { points }
    }

    /// Rebuild raw rows, e.g. for the remote imputation request or the
    /// export collaborator.
    pub fn to_rows(&self, date_column: &str, value_column: &str) -> Vec<RawRow> {
        self.points
            .iter()
            .map(|p| p.to_row(date_column, value_column))
            .collect()
    }
}

impl FromIterator<TimePoint> for Series {
    fn from_iter<I: IntoIterator<Item = TimePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Parse a raw cell as a calendar date.
///
/// Accepts ISO dates, RFC 3339 timestamps (date part taken) and the two
/// slash-separated layouts the upload paths produce.
fn parse_date(cell: &Value) -> Option<NaiveDate> {
    let text = cell.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    for format in ["%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    None
}

/// Parse a raw cell as a number. Empty strings and non-numeric text are
/// missing, not errors.
fn parse_value(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}
