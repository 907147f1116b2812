//! # Periods
//!
//! Date-range primitives used by every part of the tax engine.
//!
//! ## Conventions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stays are HALF-OPEN:   [arrival, departure)                            │
//! │                                                                         │
//! │     Mar 29   Mar 30   Mar 31   Apr 1    Apr 2  │ Apr 3                  │
//! │     night    night    night    night    night  │ (departure, no night)  │
//! │                                                                         │
//! │  Rule validity is INCLUSIVE:   [valid_from, valid_to]                   │
//! │  and becomes [valid_from, valid_to + 1 day) before clipping, so a rule  │
//! │  ending on a stay's last night still taxes that night.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Number of days from `from` to `to` (negative when `to` is earlier).
#[inline]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

// =============================================================================
// Stay Period
// =============================================================================

/// A half-open range of calendar days `[start, end)`.
///
/// Each day in the range stands for the night starting on that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl StayPeriod {
    /// Creates a period, rejecting `end < start`. Empty periods are allowed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidDateRange {
                field: "period".to_string(),
                start,
                end,
            });
        }
        Ok(StayPeriod { start, end })
    }

    /// A zero-night period on `day`.
    pub fn empty_at(day: NaiveDate) -> Self {
        StayPeriod { start: day, end: day }
    }

    /// Converts an inclusive `[first, last]` window into `[first, last + 1)`.
    ///
    /// `last` is expected to be on or after `first`; an inverted window
    /// produces an empty period.
    pub fn from_inclusive(first: NaiveDate, last: NaiveDate) -> Self {
        let end = last.succ_opt().unwrap_or(NaiveDate::MAX);
        StayPeriod {
            start: first,
            end: end.max(first),
        }
    }

    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights in the period.
    #[inline]
    pub fn nights(&self) -> i64 {
        days_between(self.start, self.end)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True if the night starting on `day` lies in the period.
    #[inline]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// True if the two periods share at least one night.
    #[inline]
    pub fn overlaps(&self, other: &StayPeriod) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Clips this period to `other`; `None` when no night is shared.
    pub fn intersect(&self, other: &StayPeriod) -> Option<StayPeriod> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(StayPeriod { start, end })
    }

    /// Nights shared with `other`, zero when disjoint.
    #[inline]
    pub fn overlap_nights(&self, other: &StayPeriod) -> i64 {
        self.intersect(other).map_or(0, |p| p.nights())
    }

    /// The first `nights` nights of this period (never longer than the period).
    pub fn truncate(&self, nights: i64) -> StayPeriod {
        let nights = nights.clamp(0, self.nights().max(0));
        let end = self
            .start
            .checked_add_days(chrono::Days::new(nights as u64))
            .unwrap_or(self.end);
        StayPeriod {
            start: self.start,
            end: end.min(self.end),
        }
    }
}

impl fmt::Display for StayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// =============================================================================
// Calendar Month
// =============================================================================

/// One calendar month of one year, the unit of a tax declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// Creates a month, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::OutOfRange {
                field: "month".to_string(),
                min: 1,
                max: 12,
            });
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ValidationError::invalid_format("year", "outside the supported calendar"));
        }
        Ok(CalendarMonth { year, month })
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // new() already checked that this date exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following month.
    pub fn next_month_start(&self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    /// The whole month as `[first_day, next_month_start)`.
    pub fn period(&self) -> StayPeriod {
        StayPeriod {
            start: self.first_day(),
            end: self.next_month_start(),
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
