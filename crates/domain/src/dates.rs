// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Date range conventions.
//!
//! Two conventions coexist and must never be mixed:
//!
//! - [`InclusiveDateRange`] — calendar ranges selected by an operator
//!   (bulk edits, calendars, restrictions). Both endpoints are included.
//! - [`HalfOpenInterval`] — stays (`[check_in, check_out)`). The check-out
//!   day is not occupied, so back-to-back stays do not conflict.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

/// Iterates every date in `[start, end]`.
fn days_between_inclusive(start: Date, end: Date) -> impl Iterator<Item = Date> {
    std::iter::successors(Some(start), |d: &Date| d.next_day()).take_while(move |d| *d <= end)
}

/// Shifts a date by a signed number of days.
///
/// # Errors
///
/// Returns an error if the result is outside the supported calendar.
pub fn shift_date(date: Date, days: i64) -> Result<Date, DomainError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("shifting {date} by {days} days"),
        })
}

/// A calendar range with both endpoints included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InclusiveDateRange {
    start: Date,
    end: Date,
}

impl InclusiveDateRange {
    /// Creates a new inclusive range.
    ///
    /// A single-day range (`start == end`) is valid.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateRange` if `end` is before `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the first day of the range.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last day of the range (included).
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Number of calendar days covered, counting both endpoints.
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    /// Returns true if the date falls within the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates every day in the range.
    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        days_between_inclusive(self.start, self.end)
    }

    /// Iterates the days in the range whose weekday is in `days_of_week`.
    ///
    /// Weekdays are numbered from Monday (`0`) to Sunday (`6`).
    /// An empty filter selects nothing; callers pass `None` upstream to mean
    /// "every day".
    pub fn days_matching<'a>(&self, days_of_week: &'a [u8]) -> impl Iterator<Item = Date> + use<'a> {
        days_between_inclusive(self.start, self.end)
            .filter(move |d| days_of_week.contains(&d.weekday().number_days_from_monday()))
    }
}

/// A stay interval `[start, end)`.
///
/// The end date is the departure date and is not occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HalfOpenInterval {
    start: Date,
    end: Date,
}

impl HalfOpenInterval {
    /// Creates a new half-open interval.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInterval` unless `end > start`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the first occupied day (check-in).
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the departure day (not occupied).
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Number of occupied nights.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.end - self.start).whole_days()
    }

    /// Returns true if the date is an occupied night of this interval.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }

    /// Half-open overlap: `NOT (end <= other.start OR start >= other.end)`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    /// Iterates the occupied nights (the departure day is excluded).
    pub fn nights_iter(&self) -> impl Iterator<Item = Date> + use<> {
        let end: Date = self.end;
        std::iter::successors(Some(self.start), |d: &Date| d.next_day())
            .take_while(move |d| *d < end)
    }

    /// Returns the same interval moved by a signed number of days.
    ///
    /// # Errors
    ///
    /// Returns an error on calendar overflow.
    pub fn shifted(&self, days: i64) -> Result<Self, DomainError> {
        Ok(Self {
            start: shift_date(self.start, days)?,
            end: shift_date(self.end, days)?,
        })
    }

    /// Returns the same interval with a later end, or itself if `end` is not later.
    #[must_use]
    pub fn extended_to(&self, end: Date) -> Self {
        Self {
            start: self.start,
            end: self.end.max(end),
        }
    }

    /// Number of nights shared with `[range_start, range_end)`.
    #[must_use]
    pub fn intersection_nights(&self, range_start: Date, range_end: Date) -> i64 {
        let effective_start: Date = self.start.max(range_start);
        let effective_end: Date = self.end.min(range_end);
        if effective_start < effective_end {
            (effective_end - effective_start).whole_days()
        } else {
            0
        }
    }
}
