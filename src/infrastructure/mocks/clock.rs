//! Mock clock for testing.

use crate::application::ports::Clock;
use chrono::{Duration, NaiveDateTime};
use std::sync::{Arc, Mutex};

/// Mock clock for testing.
///
/// Allows tests to control time progression explicitly, so day rollovers
/// can be exercised deterministically.
///
/// # Examples
///
/// ```
/// use attempt_gate::infrastructure::mocks::MockClock;
/// use attempt_gate::application::ports::Clock;
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2026, 10, 19)
///     .unwrap()
///     .and_hms_opt(23, 30, 0)
///     .unwrap();
/// let clock = MockClock::new(start);
/// assert_eq!(clock.now(), start);
///
/// // Crossing midnight changes the calendar day
/// clock.advance(Duration::hours(1));
/// assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
/// ```
///
/// # Thread Safety
///
/// `MockClock` can be cloned to share across threads. All clones share the
/// same underlying time value.
#[derive(Debug, Clone)]
pub struct MockClock {
    current_time: Arc<Mutex<NaiveDateTime>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific time.
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time += duration;
    }

    /// Set the clock to a specific time.
    pub fn set(&self, time: NaiveDateTime) {
        let mut current = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *current = time;
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_mock_clock() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let clock = MockClock::new(start);

        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(10));
        assert_eq!(clock.now(), start + Duration::seconds(10));

        let later = start + Duration::days(3);
        clock.set(later);
        assert_eq!(clock.now(), later);
        assert_eq!(clock.today(), later.date());
    }

    #[test]
    fn test_clones_share_time() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let clock = MockClock::new(start);
        let other = clock.clone();

        other.advance(Duration::days(1));
        assert_eq!(clock.now(), start + Duration::days(1));
    }
}
