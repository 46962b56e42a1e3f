//! Date windows queried from a source

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive `[since, until]` date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl TimeWindow {
    /// Build a window, clamping `since` so it never passes `until`
    pub fn new(since: NaiveDate, until: NaiveDate) -> Self {
        Self {
            since: since.min(until),
            until,
        }
    }

    /// Width of the window in days
    pub fn days(&self) -> i64 {
        (self.until - self.since).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.since && date <= self.until
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.since, self.until)
    }
}
