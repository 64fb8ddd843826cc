//! Inclusive date window for rate timeseries requests.

use chrono::{Days, NaiveDate};

use crate::error::{ModelError, Result};

/// Date format used by every layer for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive `[start, end]` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatesWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl RatesWindow {
    /// Create a window, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ModelError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The window of `days` calendar days ending at `end` (inclusive).
    ///
    /// `days == 0` is treated as a single-day window. Fails when the start
    /// would fall before the earliest representable date.
    pub fn ending_at(end: NaiveDate, days: u32) -> Result<Self> {
        let back = u64::from(days.saturating_sub(1));
        let start = end
            .checked_sub_days(Days::new(back))
            .ok_or(ModelError::WindowOutOfRange { end, days })?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Format a date the way every layer stores it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
