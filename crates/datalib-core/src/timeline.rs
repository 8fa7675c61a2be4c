//! Timeline windows: a coarse view mode plus an anchor date, derived into
//! the inclusive start/end pair the API scopes results by.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Granularity of the timeline view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Day => "day",
            ViewMode::Week => "week",
            ViewMode::Month => "month",
            ViewMode::Year => "year",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            "year" => Ok(ViewMode::Year),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// An inclusive date range, serialized as `start_date`/`end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The timeline's current window: mode plus anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineWindow {
    pub mode: ViewMode,
    pub anchor: NaiveDate,
}

impl TimelineWindow {
    pub fn new(mode: ViewMode, anchor: NaiveDate) -> Self {
        Self { mode, anchor }
    }

    /// The inclusive range covered by the window. Weeks are ISO weeks
    /// (Monday through Sunday); months and years are calendar periods.
    pub fn range(&self) -> DateRange {
        match self.mode {
            ViewMode::Day => DateRange {
                start: self.anchor,
                end: self.anchor,
            },
            ViewMode::Week => {
                let back = u64::from(self.anchor.weekday().num_days_from_monday());
                let start = self
                    .anchor
                    .checked_sub_days(Days::new(back))
                    .unwrap_or(self.anchor);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
                DateRange { start, end }
            }
            ViewMode::Month => {
                let start = self.anchor.with_day(1).unwrap_or(self.anchor);
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.checked_sub_days(Days::new(1)))
                    .unwrap_or(start);
                DateRange { start, end }
            }
            ViewMode::Year => {
                let year = self.anchor.year();
                let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(self.anchor);
                let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(self.anchor);
                DateRange { start, end }
            }
        }
    }

    /// Moves the anchor forward (positive) or back (negative) by whole
    /// window units. Saturates at the calendar's edges.
    pub fn shifted(&self, steps: i32) -> Self {
        let anchor = match self.mode {
            ViewMode::Day => shift_days(self.anchor, i64::from(steps)),
            ViewMode::Week => shift_days(self.anchor, i64::from(steps) * 7),
            ViewMode::Month => shift_months(self.anchor, steps),
            ViewMode::Year => shift_months(self.anchor, steps.saturating_mul(12)),
        };
        Self {
            mode: self.mode,
            anchor,
        }
    }
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

impl fmt::Display for TimelineWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = self.range();
        write!(f, "{} {}..{}", self.mode, range.start, range.end)
    }
}
