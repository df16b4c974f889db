use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use gatepass_core::{Direction, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One employee scan, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub timestamp: NaiveDateTime,
    #[serde(alias = "scan_status")]
    pub direction: Direction,
}

impl AttendanceEvent {
    pub fn new(timestamp: NaiveDateTime, direction: Direction) -> Self {
        Self {
            timestamp,
            direction,
        }
    }

    /// Shorthand for a sign-in.
    pub fn sign_in(timestamp: NaiveDateTime) -> Self {
        Self::new(timestamp, Direction::In)
    }

    /// Shorthand for a sign-out.
    pub fn sign_out(timestamp: NaiveDateTime) -> Self {
        Self::new(timestamp, Direction::Out)
    }

    /// Local calendar date of the event.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Inclusive range of calendar dates.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use gatepass_attendance::DateRange;
///
/// let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
///
/// let range = DateRange::new(start, end).unwrap();
/// assert_eq!(range.days(), 31);
/// assert!(DateRange::new(end, start).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateRange` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The `days` days before `today`, through `today`.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateRange` if `days` is negative or reaches
    /// before the earliest representable date.
    pub fn last_days(days: i64, today: NaiveDate) -> Result<Self> {
        let invalid = || Error::InvalidDateRange {
            start: format!("{today} minus {days} days"),
            end: today.to_string(),
        };
        if days < 0 {
            return Err(invalid());
        }

        let start = TimeDelta::try_days(days)
            .and_then(|span| today.checked_sub_signed(span))
            .ok_or_else(invalid)?;
        Self::new(start, today)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns `true` if `date` falls within the range (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Worked time for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBreakdownEntry {
    pub date: NaiveDate,
    pub sign_in: Option<NaiveTime>,
    pub sign_out: Option<NaiveTime>,
    /// Worked hours, full precision.
    pub hours: f64,
    /// Missing sign-in or sign-out. Counts zero hours and no worked day.
    pub incomplete: bool,
}

impl DailyBreakdownEntry {
    pub fn is_complete(&self) -> bool {
        !self.incomplete
    }
}
