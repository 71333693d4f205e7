//! Observability metrics for the attempt gate.
//!
//! Counts decisions and the failures the gate absorbed while failing open.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking gate activity.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Checks that were allowed and counted
    attempts_allowed: AtomicU64,
    /// Checks that were blocked
    attempts_blocked: AtomicU64,
    /// Explicit unlocks
    resets: AtomicU64,
    /// Store reads or writes that failed
    storage_errors: AtomicU64,
    /// Stored values that could not be decoded
    corrupt_records: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                attempts_allowed: AtomicU64::new(0),
                attempts_blocked: AtomicU64::new(0),
                resets: AtomicU64::new(0),
                storage_errors: AtomicU64::new(0),
                corrupt_records: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_allowed(&self) {
        self.inner.attempts_allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_blocked(&self) {
        self.inner.attempts_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reset(&self) {
        self.inner.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_storage_error(&self) {
        self.inner.storage_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_corrupt_record(&self) {
        self.inner.corrupt_records.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of allowed attempts.
    pub fn attempts_allowed(&self) -> u64 {
        self.inner.attempts_allowed.load(Ordering::Relaxed)
    }

    /// Get the number of blocked attempts.
    pub fn attempts_blocked(&self) -> u64 {
        self.inner.attempts_blocked.load(Ordering::Relaxed)
    }

    /// Get the number of explicit resets.
    pub fn resets(&self) -> u64 {
        self.inner.resets.load(Ordering::Relaxed)
    }

    /// Get the number of storage failures absorbed.
    pub fn storage_errors(&self) -> u64 {
        self.inner.storage_errors.load(Ordering::Relaxed)
    }

    /// Get the number of corrupt stored values encountered.
    pub fn corrupt_records(&self) -> u64 {
        self.inner.corrupt_records.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts_allowed: self.attempts_allowed(),
            attempts_blocked: self.attempts_blocked(),
            resets: self.resets(),
            storage_errors: self.storage_errors(),
            corrupt_records: self.corrupt_records(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.attempts_allowed.store(0, Ordering::Relaxed);
        self.inner.attempts_blocked.store(0, Ordering::Relaxed);
        self.inner.resets.store(0, Ordering::Relaxed);
        self.inner.storage_errors.store(0, Ordering::Relaxed);
        self.inner.corrupt_records.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Checks that were allowed and counted
    pub attempts_allowed: u64,
    /// Checks that were blocked
    pub attempts_blocked: u64,
    /// Explicit unlocks
    pub resets: u64,
    /// Store reads or writes that failed
    pub storage_errors: u64,
    /// Stored values that could not be decoded
    pub corrupt_records: u64,
}

impl MetricsSnapshot {
    /// Fraction of checks that were blocked (0.0 to 1.0).
    ///
    /// Returns 0.0 if no checks have been made.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_checks();
        if total == 0 {
            0.0
        } else {
            self.attempts_blocked as f64 / total as f64
        }
    }

    /// Total number of checks (allowed + blocked).
    pub fn total_checks(&self) -> u64 {
        self.attempts_allowed.saturating_add(self.attempts_blocked)
    }
}
