//! Calendar-month reporting periods.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PeriodError, PeriodResult};

/// A calendar month in UTC, identified by a `YYYY-MM` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
    start: NaiveDate,
    next_start: NaiveDate,
}

/// Where a period sits relative to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Starts after now.
    Future,
    /// Contains now.
    Active,
    /// Ended before now.
    Complete,
}

impl Period {
    /// Build a period, validating the month.
    pub fn new(year: i32, month: u32) -> PeriodResult<Self> {
        let label = format!("{year:04}-{month:02}");
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth {
                input: label,
                month,
            });
        }

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        let start = NaiveDate::from_ymd_opt(year, month, 1);
        let next_start = NaiveDate::from_ymd_opt(next_year, next_month, 1);
        match (start, next_start) {
            (Some(start), Some(next_start)) => Ok(Self {
                year,
                month,
                start,
                next_start,
            }),
            _ => Err(PeriodError::InvalidFormat(label)),
        }
    }

    /// Parse a `YYYY-MM` label.
    pub fn parse(input: &str) -> PeriodResult<Self> {
        let trimmed = input.trim();
        let invalid = || PeriodError::InvalidFormat(input.to_string());

        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth {
                input: input.to_string(),
                month,
            });
        }

        Self::new(year, month)
    }

    /// The month containing `now`.
    pub fn containing(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let next = date
            .checked_add_months(Months::new(1))
            .unwrap_or(date);
        Self {
            year: date.year(),
            month: date.month(),
            start: date.with_day(1).unwrap_or(date),
            next_start: next.with_day(1).unwrap_or(next),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// `YYYY-MM` label, also the cache key for reports.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Human label, e.g. "October 2026".
    pub fn display_name(&self) -> String {
        self.start.format("%B %Y").to_string()
    }

    /// First instant of the month.
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last second of the month.
    pub fn end_date(&self) -> DateTime<Utc> {
        self.next_start.and_time(NaiveTime::MIN).and_utc() - TimeDelta::seconds(1)
    }

    /// Whether `at` falls inside the month.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_date() && at < self.next_start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Number of days in the month.
    pub fn days(&self) -> i64 {
        (self.next_start - self.start).num_days()
    }

    /// Classify relative to `now`.
    pub fn status(&self, now: DateTime<Utc>) -> PeriodStatus {
        if now < self.start_date() {
            PeriodStatus::Future
        } else if self.contains(now) {
            PeriodStatus::Active
        } else {
            PeriodStatus::Complete
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Period metadata embedded in a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// `YYYY-MM` label.
    pub period: String,
    pub display_name: String,
    pub status: PeriodStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// 0 for future, elapsed share for active, 100 for complete.
    pub progress_percent: f64,
    pub days_total: i64,
    pub days_elapsed: i64,
    /// Non-fatal gating warnings (active period, stale period).
    pub warnings: Vec<String>,
}
