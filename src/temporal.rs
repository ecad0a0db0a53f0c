//! Calendar frequencies for the reconstructed timestamp grid.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Fixed period between consecutive timestamps on a reconstructed grid.
///
/// The string codes follow the convention the upstream service uses:
/// `"D"` for daily, `"W-MON"` (through `"W-SUN"`) for weekly anchored to a
/// weekday, and `"MS"` for month-start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Frequency {
    /// One row per calendar day
    Daily,
    /// One row per week, anchored to the given weekday
    Weekly(Weekday),
    /// One row per month, on the first day of the month
    MonthStart,
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}

impl Frequency {
    /// Align the first grid timestamp.
    ///
    /// Weekly grids snap forward to the next occurrence of the anchor
    /// weekday (a date already on the anchor stays put). Month-start grids
    /// snap back to the first day of the same month, which may precede the
    /// earliest data point.
    pub fn snap_first(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => date,
            Frequency::Weekly(anchor) => {
                let ahead = (anchor.num_days_from_monday() + 7
                    - date.weekday().num_days_from_monday())
                    % 7;
                date + chrono::Days::new(u64::from(ahead))
            }
            Frequency::MonthStart => date.with_day(1).unwrap_or(date),
        }
    }

    /// The grid timestamp following `date`.
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => date + chrono::Days::new(1),
            Frequency::Weekly(_) => date + chrono::Days::new(7),
            Frequency::MonthStart => {
                let first = date.with_day(1).unwrap_or(date);
                first.checked_add_months(Months::new(1)).unwrap_or(first)
            }
        }
    }

    /// Frequency code as the upstream service spells it.
    pub fn code(&self) -> String {
        match self {
            Frequency::Daily => "D".to_string(),
            Frequency::Weekly(anchor) => {
                let day = match anchor {
                    Weekday::Mon => "MON",
                    Weekday::Tue => "TUE",
                    Weekday::Wed => "WED",
                    Weekday::Thu => "THU",
                    Weekday::Fri => "FRI",
                    Weekday::Sat => "SAT",
                    Weekday::Sun => "SUN",
                };
                format!("W-{}", day)
            }
            Frequency::MonthStart => "MS".to_string(),
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "D" | "DAY" | "DAILY" => Ok(Frequency::Daily),
            "W" | "W-MON" => Ok(Frequency::Weekly(Weekday::Mon)),
            "W-TUE" => Ok(Frequency::Weekly(Weekday::Tue)),
            "W-WED" => Ok(Frequency::Weekly(Weekday::Wed)),
            "W-THU" => Ok(Frequency::Weekly(Weekday::Thu)),
            "W-FRI" => Ok(Frequency::Weekly(Weekday::Fri)),
            "W-SAT" => Ok(Frequency::Weekly(Weekday::Sat)),
            "W-SUN" => Ok(Frequency::Weekly(Weekday::Sun)),
            "MS" | "MONTH-START" => Ok(Frequency::MonthStart),
            other => Err(Error::InvalidConfig(format!(
                "unrecognized frequency code: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<Frequency> for String {
    fn from(freq: Frequency) -> String {
        freq.code()
    }
}

impl TryFrom<String> for Frequency {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}
