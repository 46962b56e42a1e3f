//! Time source for the sync engine

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Supplies the current instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Today's calendar date as seen in `timezone`
    fn today_in(&self, timezone: Tz) -> NaiveDate {
        self.now().with_timezone(&timezone).date_naive()
    }
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
