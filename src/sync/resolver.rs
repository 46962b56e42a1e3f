//! Time window resolution
//!
//! Each direction queries its source for `[since, until]`. `until` is today
//! in the configured timezone; `since` is the direction's checkpoint, or a
//! trailing week when there is none.

use chrono::Duration;
use chrono_tz::Tz;
use tracing::debug;

use crate::error::BridgeResult;
use crate::models::{Direction, TimeWindow};
use crate::storage::StateStore;

use super::clock::Clock;

/// Days looked back when a direction has no usable checkpoint
pub const FALLBACK_LOOKBACK_DAYS: i64 = 7;

/// Computes the window each direction queries
pub struct TimeWindowResolver<'a> {
    store: &'a dyn StateStore,
    timezone: Tz,
    clock: &'a dyn Clock,
}

impl<'a> TimeWindowResolver<'a> {
    pub fn new(store: &'a dyn StateStore, timezone: Tz, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            timezone,
            clock,
        }
    }

    /// Resolve the window for `direction`
    ///
    /// A checkpoint later than today is clamped so `since <= until` holds.
    pub fn resolve(&self, direction: Direction) -> BridgeResult<TimeWindow> {
        let today = self.clock.today_in(self.timezone);
        let since = match self.store.get_checkpoint(direction)? {
            Some(checkpoint) => checkpoint.last_success_date,
            None => {
                debug!(%direction, "No checkpoint, using {}-day fallback", FALLBACK_LOOKBACK_DAYS);
                today - Duration::days(FALLBACK_LOOKBACK_DAYS)
            }
        };

        Ok(TimeWindow::new(since, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStateStore;
    use crate::sync::clock::FixedClock;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sydney_evening() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 11, 12, 20, 0, 0).unwrap())
    }

    #[test]
    fn test_fallback_window_is_seven_days_ending_today_in_timezone() {
        let store = MemoryStateStore::new();
        let clock = sydney_evening();
        let resolver = TimeWindowResolver::new(&store, chrono_tz::Australia::Sydney, &clock);

        let window = resolver.resolve(Direction::LedgerToBudget).unwrap();
        assert_eq!(window.until, date(2024, 11, 13));
        assert_eq!(window.since, date(2024, 11, 6));
        assert_eq!(window.days(), FALLBACK_LOOKBACK_DAYS);
    }

    #[test]
    fn test_checkpoint_sets_since() {
        let store = MemoryStateStore::new();
        store
            .commit_checkpoint(Direction::BudgetToLedger, date(2024, 11, 1))
            .unwrap();
        let clock = sydney_evening();
        let resolver = TimeWindowResolver::new(&store, chrono_tz::Australia::Sydney, &clock);

        let window = resolver.resolve(Direction::BudgetToLedger).unwrap();
        assert_eq!(window.since, date(2024, 11, 1));
        assert_eq!(window.until, date(2024, 11, 13));

        // The other direction has no checkpoint of its own
        let other = resolver.resolve(Direction::LedgerToBudget).unwrap();
        assert_eq!(other.since, date(2024, 11, 6));
    }

    #[test]
    fn test_future_checkpoint_is_clamped() {
        let store = MemoryStateStore::new();
        store
            .commit_checkpoint(Direction::LedgerToBudget, date(2025, 1, 1))
            .unwrap();
        let clock = sydney_evening();
        let resolver = TimeWindowResolver::new(&store, chrono_tz::Australia::Sydney, &clock);

        let window = resolver.resolve(Direction::LedgerToBudget).unwrap();
        assert_eq!(window.since, window.until);
        assert_eq!(window.until, date(2024, 11, 13));
    }

    #[test]
    fn test_unparsable_checkpoint_falls_back() {
        let store = MemoryStateStore::new();
        store.set_raw_checkpoint(Direction::LedgerToBudget, "last tuesday");
        let clock = sydney_evening();
        let resolver = TimeWindowResolver::new(&store, chrono_tz::Australia::Sydney, &clock);

        let window = resolver.resolve(Direction::LedgerToBudget).unwrap();
        assert_eq!(window.days(), FALLBACK_LOOKBACK_DAYS);
    }

    #[test]
    fn test_today_follows_configured_timezone() {
        let store = MemoryStateStore::new();
        let clock = sydney_evening();
        let resolver = TimeWindowResolver::new(&store, chrono_tz::Etc::UTC, &clock);

        let window = resolver.resolve(Direction::LedgerToBudget).unwrap();
        assert_eq!(window.until, date(2024, 11, 12));
        assert_eq!(window.since, date(2024, 11, 5));
    }
}
