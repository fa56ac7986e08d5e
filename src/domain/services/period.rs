use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::errors::ValidationError;

/// Reporting period for windowed metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Window containing `now`.
    ///
    /// * today: the current calendar day
    /// * week: the seven calendar days ending today
    /// * month: the current calendar month
    pub fn window(&self, now: DateTime<Local>) -> TimeWindow {
        let (start, end) = self.bounds(now.date_naive());
        TimeWindow::between_dates(start, end)
    }

    /// Window of the same length immediately before [`Period::window`]
    pub fn previous_window(&self, now: DateTime<Local>) -> TimeWindow {
        let today = now.date_naive();
        let (start, end) = match self {
            Period::Today => (days_before(today, 1), today),
            Period::Week => (days_before(today, 13), days_before(today, 6)),
            Period::Month => {
                let first = first_of_month(today);
                let previous = first.checked_sub_months(Months::new(1)).unwrap_or(first);
                (previous, first)
            }
        };
        TimeWindow::between_dates(start, end)
    }

    fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        match self {
            Period::Today => (today, tomorrow),
            Period::Week => (days_before(today, 6), tomorrow),
            Period::Month => {
                let first = first_of_month(today);
                let next = first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(NaiveDate::MAX);
                (first, next)
            }
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "day" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(ValidationError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Half-open `[start, end)` range in local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TimeWindow {
    /// From local midnight of `start` to local midnight of `end`
    pub fn between_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: local_midnight(start),
            end: local_midnight(end),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let local = timestamp.with_timezone(&Local);
        local >= self.start && local < self.end
    }
}

/// Start of `date` in the local zone.
///
/// Where a DST transition skips midnight, the earliest valid instant of the
/// day is used.
pub fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    match Local.from_local_datetime(&naive).earliest() {
        Some(midnight) => midnight,
        None => {
            let shifted = naive + chrono::Duration::hours(1);
            Local
                .from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| Local.from_utc_datetime(&naive))
        }
    }
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
