//! Date range validation.
//!
//! [`validate`] is a pure function: identical `(start, end, today)` inputs
//! always produce the identical result. Error messages carry a corrective
//! suggestion because they are surfaced directly to operators.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An inclusive `[start, end]` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Inclusive first date.
    pub start: NaiveDate,
    /// Inclusive last date.
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, inclusive of both endpoints.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A requested range that cannot be fetched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    /// A bound lies beyond today. Market data only exists for past dates, so
    /// the error suggests the latest usable date instead of auto-correcting
    /// an explicitly supplied bound.
    #[error("{field} date {date} is in the future; data is only available through {suggested}")]
    FutureDate {
        /// Which bound was rejected ("start" or "end").
        field: &'static str,
        /// The offending date.
        date: NaiveDate,
        /// Latest date that would have been accepted.
        suggested: NaiveDate,
    },

    /// The bounds are reversed.
    #[error("start date {start} is after end date {end}")]
    StartAfterEnd {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },
}

/// Validates and normalizes a requested range against `today`.
///
/// An omitted `end` defaults to `today`; an *explicit* future `end` is an
/// error, never silently clamped. Future-date checks run before the ordering
/// check, so a fully future range reports the future bound.
pub fn validate(
    start: NaiveDate,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateRange, RangeError> {
    if start > today {
        return Err(RangeError::FutureDate {
            field: "start",
            date: start,
            suggested: today,
        });
    }
    if let Some(end) = end {
        if end > today {
            return Err(RangeError::FutureDate {
                field: "end",
                date: end,
                suggested: today,
            });
        }
    }

    let end = end.unwrap_or(today);
    if start > end {
        return Err(RangeError::StartAfterEnd { start, end });
    }

    Ok(DateRange { start, end })
}
