//! Day-bucketed attempt counter.
//!
//! An `AttemptRecord` counts attempts within a single calendar day. The first
//! observation on a later day zeroes the count before anything else happens,
//! so every day starts with the full allowance.
//!
//! Records are stored as JSON strings:
//!
//! ```text
//! {"count":2,"window_date":"2026-10-19"}
//! ```

use crate::domain::decision::GateDecision;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a stored record cannot be decoded or encoded.
#[derive(Debug)]
pub enum RecordError {
    /// The stored value is not a valid record
    Corrupt(serde_json::Error),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Corrupt(e) => write!(f, "corrupt attempt record: {}", e),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::Corrupt(e) => Some(e),
        }
    }
}

/// Attempt count for one identity within one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    count: u32,
    window_date: NaiveDate,
}

impl AttemptRecord {
    /// Create an empty record for the given day.
    pub fn new(window_date: NaiveDate) -> Self {
        Self {
            count: 0,
            window_date,
        }
    }

    /// Create a record with an explicit count.
    pub fn with_count(count: u32, window_date: NaiveDate) -> Self {
        Self { count, window_date }
    }

    /// Attempts recorded in the window.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The calendar day this record counts.
    pub fn window_date(&self) -> NaiveDate {
        self.window_date
    }

    /// Move the window to `today`, zeroing the count if the day changed.
    ///
    /// Returns `true` if the record was reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.window_date == today {
            return false;
        }
        self.count = 0;
        self.window_date = today;
        true
    }

    /// The count as seen on `today`, without mutating the record.
    pub fn effective_count(&self, today: NaiveDate) -> u32 {
        if self.window_date == today {
            self.count
        } else {
            0
        }
    }

    /// Attempts still available on `today` under `threshold`.
    pub fn remaining(&self, threshold: u32, today: NaiveDate) -> u32 {
        threshold.saturating_sub(self.effective_count(today))
    }

    /// Consume one attempt if the allowance permits it.
    ///
    /// The count is checked before it is incremented, so a blocked call
    /// leaves the record untouched.
    pub fn try_consume(&mut self, threshold: u32) -> GateDecision {
        if self.count >= threshold {
            GateDecision::Blocked
        } else {
            self.count += 1;
            GateDecision::Allowed
        }
    }

    /// Zero the count and pin the window to `today`.
    pub fn clear(&mut self, today: NaiveDate) {
        self.count = 0;
        self.window_date = today;
    }

    /// Decode a stored record.
    pub fn from_json(raw: &str) -> Result<Self, RecordError> {
        serde_json::from_str(raw).map_err(RecordError::Corrupt)
    }

    /// Encode the record for storage.
    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(RecordError::Corrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_consume_up_to_threshold() {
        let mut record = AttemptRecord::new(day(1));

        assert_eq!(record.try_consume(3), GateDecision::Allowed);
        assert_eq!(record.try_consume(3), GateDecision::Allowed);
        assert_eq!(record.try_consume(3), GateDecision::Allowed);
        assert_eq!(record.try_consume(3), GateDecision::Blocked);
        assert_eq!(record.count(), 3);
    }

    #[test]
    fn test_blocked_does_not_increment() {
        let mut record = AttemptRecord::with_count(2, day(1));

        for _ in 0..10 {
            assert_eq!(record.try_consume(2), GateDecision::Blocked);
        }
        assert_eq!(record.count(), 2);
    }

    #[test]
    fn test_zero_threshold_blocks_immediately() {
        let mut record = AttemptRecord::new(day(1));
        assert_eq!(record.try_consume(0), GateDecision::Blocked);
        assert_eq!(record.count(), 0);
    }

    #[test]
    fn test_roll_over_resets_on_new_day() {
        let mut record = AttemptRecord::with_count(3, day(1));

        assert!(!record.roll_over(day(1)));
        assert_eq!(record.count(), 3);

        assert!(record.roll_over(day(2)));
        assert_eq!(record.count(), 0);
        assert_eq!(record.window_date(), day(2));
    }

    #[test]
    fn test_roll_over_on_earlier_day() {
        // A clock moved backwards is still a different day
        let mut record = AttemptRecord::with_count(3, day(5));
        assert!(record.roll_over(day(4)));
        assert_eq!(record.count(), 0);
    }

    #[test]
    fn test_effective_count_is_a_peek() {
        let record = AttemptRecord::with_count(2, day(1));

        assert_eq!(record.effective_count(day(1)), 2);
        assert_eq!(record.effective_count(day(2)), 0);
        assert_eq!(record.remaining(3, day(1)), 1);
        assert_eq!(record.remaining(3, day(2)), 3);

        // Record itself is unchanged
        assert_eq!(record.count(), 2);
        assert_eq!(record.window_date(), day(1));
    }

    #[test]
    fn test_remaining_saturates_above_threshold() {
        let record = AttemptRecord::with_count(7, day(1));
        assert_eq!(record.remaining(3, day(1)), 0);
    }

    #[test]
    fn test_clear() {
        let mut record = AttemptRecord::with_count(3, day(1));
        record.clear(day(1));
        assert_eq!(record.count(), 0);
        assert_eq!(record.try_consume(3), GateDecision::Allowed);
    }

    #[test]
    fn test_json_format() {
        let record = AttemptRecord::with_count(2, day(19));
        let json = record.to_json().unwrap();
        assert_eq!(json, r#"{"count":2,"window_date":"2026-10-19"}"#);
        assert_eq!(AttemptRecord::from_json(&json).unwrap(), record);
    }

    #[test]
    fn test_corrupt_json_is_rejected() {
        assert!(matches!(
            AttemptRecord::from_json("not json"),
            Err(RecordError::Corrupt(_))
        ));
        assert!(AttemptRecord::from_json(r#"{"count":-1,"window_date":"2026-10-19"}"#).is_err());
        assert!(AttemptRecord::from_json(r#"{"count":1,"window_date":"yesterday"}"#).is_err());
        assert!(AttemptRecord::from_json("3").is_err());
    }
}
