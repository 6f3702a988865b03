//! Periods
//!
//! A calculation period is a closed range of calendar dates. Both ends are
//! inclusive, so a period covering a single day has `start == end`.

use std::fmt;

use jiff::{ToSpan, civil::Date};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing or shifting a period.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// The period ends before it starts.
    #[error("period end {end} is before period start {start}")]
    EndBeforeStart {
        /// Requested start date.
        start: Date,
        /// Requested end date.
        end: Date,
    },

    /// Date arithmetic left the supported calendar range.
    #[error("period date arithmetic out of range")]
    OutOfRange,
}

/// Inclusive calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PeriodBounds")]
pub struct Period {
    start: Date,
    end: Date,
}

#[derive(Deserialize)]
struct PeriodBounds {
    start: Date,
    end: Date,
}

impl TryFrom<PeriodBounds> for Period {
    type Error = PeriodError;

    fn try_from(bounds: PeriodBounds) -> Result<Self, Self::Error> {
        Period::new(bounds.start, bounds.end)
    }
}

impl Period {
    /// Create a period from inclusive start and end dates.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::EndBeforeStart`] when `end < start`.
    pub fn new(start: Date, end: Date) -> Result<Self, PeriodError> {
        if end < start {
            return Err(PeriodError::EndBeforeStart { start, end });
        }

        Ok(Self { start, end })
    }

    /// First day of the period.
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Last day of the period.
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        days_between(self.start, self.end) + 1
    }

    /// Whether the two periods share at least one day.
    pub fn overlaps(&self, other: &Period) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `other` lies entirely within this period.
    pub fn contains(&self, other: &Period) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The same calendar dates one year earlier.
    ///
    /// February 29th is clamped to February 28th in non-leap years.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::OutOfRange`] when the shifted dates are not representable.
    pub fn previous_year(&self) -> Result<Self, PeriodError> {
        let start = self
            .start
            .checked_sub(1.year())
            .map_err(|_err| PeriodError::OutOfRange)?;

        let end = self
            .end
            .checked_sub(1.year())
            .map_err(|_err| PeriodError::OutOfRange)?;

        Period::new(start, end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Whole days from `from` to `to`; negative when `to` precedes `from`.
pub(crate) fn days_between(from: Date, to: Date) -> i64 {
    from.duration_until(to).as_hours() / 24
}
