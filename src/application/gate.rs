//! The attempt gate.
//!
//! Decides whether a rate-limited action may proceed for an anonymous
//! identity and records that it did. Counting is bucketed per calendar day
//! and uses check-then-increment, so at most `threshold` attempts are counted
//! per identity per day and a blocked call never touches the stored count.
//!
//! Storage failures never surface to the caller. Unreadable state is treated
//! as absent, failed writes are logged, and the gate fails open. It is a soft
//! friction mechanism, not an access-control boundary.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, IdentitySource, KeyValueStore, StorageError};
use crate::domain::{
    decision::{GateDecision, GateStatus},
    identity::AnonymousIdentity,
    record::{AttemptRecord, RecordError},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Default number of attempts per identity per day.
pub const DEFAULT_THRESHOLD: u32 = 3;

/// Default prefix for every key the gate writes.
pub const DEFAULT_KEY_PREFIX: &str = "attempt-gate:";

/// Default prefix for generated identities.
pub const DEFAULT_IDENTITY_PREFIX: &str = "device_";

/// Gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Attempts allowed per identity per calendar day
    pub threshold: u32,
    /// Prefix for all storage keys
    pub key_prefix: String,
    /// Prefix for generated identity tokens
    pub identity_prefix: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            identity_prefix: DEFAULT_IDENTITY_PREFIX.to_string(),
        }
    }
}

impl GateConfig {
    /// Key holding the installation's identity.
    pub fn identity_key(&self) -> String {
        format!("{}device_id", self.key_prefix)
    }

    /// Key holding the attempt record for `identity`.
    pub fn record_key(&self, identity: &AnonymousIdentity) -> String {
        format!("{}attempts:{}", self.key_prefix, identity)
    }

    /// Key holding the signup flag.
    pub fn registered_key(&self) -> String {
        format!("{}registered", self.key_prefix)
    }
}

/// Day-bucketed attempt gate.
///
/// Cheap to clone; clones share the store, clock, metrics and lock.
///
/// # Example
/// ```
/// use attempt_gate::{AttemptGate, GateDecision};
///
/// let gate = AttemptGate::builder().with_threshold(2).build().unwrap();
/// let id = gate.ensure_identity();
///
/// assert_eq!(gate.consume(&id), GateDecision::Allowed);
/// assert_eq!(gate.consume(&id), GateDecision::Allowed);
/// assert_eq!(gate.consume(&id), GateDecision::Blocked);
///
/// gate.reset(&id);
/// assert_eq!(gate.remaining_today(&id), 2);
/// ```
#[derive(Clone)]
pub struct AttemptGate {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    identities: Arc<dyn IdentitySource>,
    config: GateConfig,
    metrics: Metrics,
    // Serializes load-check-persist so concurrent callers cannot overshoot
    lock: Arc<Mutex<()>>,
}

impl fmt::Debug for AttemptGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttemptGate")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl AttemptGate {
    /// Create a gate from its collaborators.
    ///
    /// Most callers should use [`AttemptGate::builder`].
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        identities: Arc<dyn IdentitySource>,
        config: GateConfig,
    ) -> Self {
        Self {
            store,
            clock,
            identities,
            config,
            metrics: Metrics::new(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Return the installation's identity, creating and persisting it on first use.
    ///
    /// Idempotent while the store works. If the store cannot be read, a
    /// throwaway identity is returned and nothing is written, so an existing
    /// identity is never overwritten.
    pub fn ensure_identity(&self) -> AnonymousIdentity {
        let key = self.config.identity_key();
        let _guard = self.lock();

        match self.store.get(&key) {
            Ok(Some(raw)) => match AnonymousIdentity::parse(&raw) {
                Some(identity) => return identity,
                None => {
                    warn!(key = %key, "Stored device identity is blank, replacing it");
                    self.metrics.record_corrupt_record();
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read device identity, using a temporary one");
                self.metrics.record_storage_error();
                return self.identities.generate(self.clock.now());
            }
        }

        let identity = self.identities.generate(self.clock.now());
        if let Err(e) = self.store.set(&key, identity.as_str()) {
            warn!(
                error = %e,
                identity = %identity,
                "Failed to persist device identity"
            );
            self.metrics.record_storage_error();
        } else {
            info!(identity = %identity, "Created anonymous device identity");
        }
        identity
    }

    /// Check the allowance for `identity` and consume one attempt if possible.
    ///
    /// 1. Load the record, treating a missing or unreadable one as empty for today.
    /// 2. If the record belongs to an earlier day, zero it and persist.
    /// 3. If the count has reached `threshold`, return `Blocked` without incrementing.
    /// 4. Otherwise increment, persist, and return `Allowed`.
    pub fn check_and_consume(
        &self,
        identity: &AnonymousIdentity,
        threshold: u32,
        now: NaiveDateTime,
    ) -> GateDecision {
        let today = now.date();
        let key = self.config.record_key(identity);
        let _guard = self.lock();

        let mut record = self.load_record(&key, today);
        if record.roll_over(today) {
            debug!(identity = %identity, window = %today, "Attempt window rolled over");
            self.persist_record(&key, &record);
        }

        let decision = record.try_consume(threshold);
        match decision {
            GateDecision::Allowed => {
                self.persist_record(&key, &record);
                self.metrics.record_allowed();
            }
            GateDecision::Blocked => self.metrics.record_blocked(),
        }

        debug!(
            identity = %identity,
            count = record.count(),
            threshold,
            decision = ?decision,
            "Attempt gate decision"
        );
        decision
    }

    /// Zero the count for `identity`, regardless of the day.
    ///
    /// Used when the installation is bound to a registered account.
    pub fn reset(&self, identity: &AnonymousIdentity) {
        let key = self.config.record_key(identity);
        let _guard = self.lock();

        let today = self.clock.today();
        let mut record = self.peek_record(&key, today);
        record.clear(today);
        self.persist_record(&key, &record);
        self.metrics.record_reset();
        info!(identity = %identity, "Attempt count reset");
    }

    /// Attempts still available to `identity` on the day of `now`.
    ///
    /// Applies the day-rollover rule without persisting anything. Unreadable
    /// state reads as zero used; it is logged at debug level and not counted
    /// in the metrics, so polling for display leaves them untouched.
    pub fn remaining(
        &self,
        identity: &AnonymousIdentity,
        threshold: u32,
        now: NaiveDateTime,
    ) -> u32 {
        let today = now.date();
        let key = self.config.record_key(identity);
        self.peek_record(&key, today).remaining(threshold, today)
    }

    /// [`check_and_consume`](Self::check_and_consume) with the configured
    /// threshold and the injected clock.
    pub fn consume(&self, identity: &AnonymousIdentity) -> GateDecision {
        self.check_and_consume(identity, self.config.threshold, self.clock.now())
    }

    /// [`remaining`](Self::remaining) with the configured threshold and the
    /// injected clock.
    pub fn remaining_today(&self, identity: &AnonymousIdentity) -> u32 {
        self.remaining(identity, self.config.threshold, self.clock.now())
    }

    /// Progress view for `identity` at the injected clock's current time.
    pub fn status(&self, identity: &AnonymousIdentity) -> GateStatus {
        self.status_at(identity, self.clock.now())
    }

    /// Progress view for `identity` on the day of `now`.
    ///
    /// Read-only, like [`remaining`](Self::remaining).
    pub fn status_at(&self, identity: &AnonymousIdentity, now: NaiveDateTime) -> GateStatus {
        let today = now.date();
        let key = self.config.record_key(identity);
        let used = self.peek_record(&key, today).effective_count(today);
        GateStatus::new(used, self.config.threshold)
    }

    /// The configured daily threshold.
    pub fn threshold(&self) -> u32 {
        self.config.threshold
    }

    /// The gate configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The gate metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub(crate) fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fetch_record(&self, key: &str) -> Result<Option<AttemptRecord>, LoadFailure> {
        match self.store.get(key) {
            Ok(Some(raw)) => AttemptRecord::from_json(&raw)
                .map(Some)
                .map_err(LoadFailure::Corrupt),
            Ok(None) => Ok(None),
            Err(e) => Err(LoadFailure::Storage(e)),
        }
    }

    /// Load for a mutating operation: failures are warned about and counted.
    fn load_record(&self, key: &str, today: NaiveDate) -> AttemptRecord {
        match self.fetch_record(key) {
            Ok(record) => record.unwrap_or_else(|| AttemptRecord::new(today)),
            Err(LoadFailure::Corrupt(e)) => {
                warn!(error = %e, key = %key, "Discarding unreadable attempt record");
                self.metrics.record_corrupt_record();
                AttemptRecord::new(today)
            }
            Err(LoadFailure::Storage(e)) => {
                warn!(error = %e, key = %key, "Failed to load attempt record");
                self.metrics.record_storage_error();
                AttemptRecord::new(today)
            }
        }
    }

    /// Load for a read-only view: failures only reach the debug log.
    fn peek_record(&self, key: &str, today: NaiveDate) -> AttemptRecord {
        match self.fetch_record(key) {
            Ok(record) => record.unwrap_or_else(|| AttemptRecord::new(today)),
            Err(e) => {
                debug!(
                    error = %e,
                    key = %key,
                    "Attempt record unreadable, reading as empty"
                );
                AttemptRecord::new(today)
            }
        }
    }

    fn persist_record(&self, key: &str, record: &AttemptRecord) {
        let result = match record.to_json() {
            Ok(raw) => self.store.set(key, &raw).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(e) = result {
            warn!(
                error = %e,
                key = %key,
                count = record.count(),
                "Failed to persist attempt record"
            );
            self.metrics.record_storage_error();
        }
    }
}

enum LoadFailure {
    Storage(StorageError),
    Corrupt(RecordError),
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailure::Storage(e) => fmt::Display::fmt(e, f),
            LoadFailure::Corrupt(e) => fmt::Display::fmt(e, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_store::MemoryStore;
    use crate::infrastructure::mocks::{FailingStore, MockClock, SequentialIdentitySource};
    use chrono::{Duration, NaiveDate};

    fn noon(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn gate_with(store: Arc<dyn KeyValueStore>, clock: Arc<MockClock>) -> AttemptGate {
        AttemptGate::new(
            store,
            clock,
            Arc::new(SequentialIdentitySource::new("test_")),
            GateConfig::default(),
        )
    }

    fn memory_gate() -> (AttemptGate, Arc<MemoryStore>, Arc<MockClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MockClock::new(noon(19)));
        let gate = gate_with(store.clone(), clock.clone());
        (gate, store, clock)
    }

    #[test]
    fn test_threshold_then_blocked() {
        let (gate, _, _) = memory_gate();
        let id = gate.ensure_identity();

        assert_eq!(gate.check_and_consume(&id, 3, noon(19)), GateDecision::Allowed);
        assert_eq!(gate.check_and_consume(&id, 3, noon(19)), GateDecision::Allowed);
        assert_eq!(gate.check_and_consume(&id, 3, noon(19)), GateDecision::Allowed);
        assert_eq!(gate.check_and_consume(&id, 3, noon(19)), GateDecision::Blocked);
    }

    #[test]
    fn test_blocked_leaves_stored_count_at_threshold() {
        let (gate, store, _) = memory_gate();
        let id = gate.ensure_identity();

        for _ in 0..10 {
            gate.check_and_consume(&id, 2, noon(19));
        }

        let raw = store.get(&gate.config().record_key(&id)).unwrap().unwrap();
        let record = AttemptRecord::from_json(&raw).unwrap();
        assert_eq!(record.count(), 2);
    }

    #[test]
    fn test_day_rollover_restores_allowance() {
        let (gate, _, _) = memory_gate();
        let id = gate.ensure_identity();

        for _ in 0..3 {
            gate.check_and_consume(&id, 3, noon(19));
        }
        assert_eq!(gate.check_and_consume(&id, 3, noon(19)), GateDecision::Blocked);

        assert_eq!(gate.remaining(&id, 3, noon(20)), 3);
        assert_eq!(gate.check_and_consume(&id, 3, noon(20)), GateDecision::Allowed);
        assert_eq!(gate.remaining(&id, 3, noon(20)), 2);
    }

    #[test]
    fn test_rollover_happens_at_midnight() {
        let (gate, _, _) = memory_gate();
        let id = gate.ensure_identity();
        let late = noon(19) + Duration::hours(11) + Duration::minutes(59);

        for _ in 0..3 {
            gate.check_and_consume(&id, 3, late);
        }
        assert_eq!(gate.check_and_consume(&id, 3, late), GateDecision::Blocked);

        let just_after_midnight = late + Duration::minutes(2);
        assert_eq!(
            gate.check_and_consume(&id, 3, just_after_midnight),
            GateDecision::Allowed
        );
    }

    #[test]
    fn test_remaining_is_side_effect_free() {
        let (gate, store, _) = memory_gate();
        let id = gate.ensure_identity();
        gate.check_and_consume(&id, 3, noon(19));

        let key = gate.config().record_key(&id);
        let before = store.get(&key).unwrap();
        assert_eq!(gate.remaining(&id, 3, noon(25)), 3);
        assert_eq!(store.get(&key).unwrap(), before);
    }

    #[test]
    fn test_peeks_leave_metrics_untouched() {
        let clock = Arc::new(MockClock::new(noon(19)));
        let store = Arc::new(FailingStore::new());
        let gate = gate_with(store.clone(), clock);
        let id = gate.ensure_identity();

        store.fail_reads(true);
        for _ in 0..20 {
            assert_eq!(gate.remaining_today(&id), 3);
            assert_eq!(gate.status(&id).used, 0);
        }
        assert_eq!(gate.metrics().storage_errors(), 0);

        store.fail_reads(false);
        store
            .inner()
            .set(&gate.config().record_key(&id), "{garbage")
            .unwrap();
        for _ in 0..20 {
            assert_eq!(gate.remaining_today(&id), 3);
        }
        assert_eq!(gate.metrics().corrupt_records(), 0);

        // The mutating path still counts
        gate.consume(&id);
        assert_eq!(gate.metrics().corrupt_records(), 1);
    }

    #[test]
    fn test_reset_pins_window_to_today() {
        let (gate, store, _) = memory_gate();
        let id = gate.ensure_identity();
        let key = gate.config().record_key(&id);

        for _ in 0..3 {
            gate.check_and_consume(&id, 3, noon(17));
        }
        gate.reset(&id);

        let record = AttemptRecord::from_json(&store.get(&key).unwrap().unwrap()).unwrap();
        assert_eq!(record.count(), 0);
        assert_eq!(record.window_date(), noon(19).date());
    }

    #[test]
    fn test_reset_unlocks_same_day() {
        let (gate, _, _) = memory_gate();
        let id = gate.ensure_identity();

        for _ in 0..3 {
            gate.consume(&id);
        }
        assert_eq!(gate.consume(&id), GateDecision::Blocked);

        gate.reset(&id);
        assert_eq!(gate.consume(&id), GateDecision::Allowed);
        assert_eq!(gate.metrics().resets(), 1);
    }

    #[test]
    fn test_ensure_identity_is_stable() {
        let (gate, _, _) = memory_gate();
        let first = gate.ensure_identity();
        let second = gate.ensure_identity();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "test_1");
    }

    #[test]
    fn test_ensure_identity_does_not_touch_counts() {
        let (gate, _, _) = memory_gate();
        let id = gate.ensure_identity();
        gate.consume(&id);
        gate.consume(&id);

        // Re-initialising the screen must not clear the counter
        let again = gate.ensure_identity();
        assert_eq!(again, id);
        assert_eq!(gate.remaining_today(&id), 1);
    }

    #[test]
    fn test_blank_stored_identity_is_replaced() {
        let (gate, store, _) = memory_gate();
        store.set(&gate.config().identity_key(), "  ").unwrap();

        let id = gate.ensure_identity();
        assert_eq!(id.as_str(), "test_1");
        assert_eq!(gate.metrics().corrupt_records(), 1);
        assert_eq!(gate.ensure_identity(), id);
    }

    #[test]
    fn test_corrupt_record_reads_as_zero() {
        let (gate, store, _) = memory_gate();
        let id = gate.ensure_identity();
        store.set(&gate.config().record_key(&id), "{garbage").unwrap();

        assert_eq!(gate.remaining_today(&id), 3);
        assert_eq!(gate.consume(&id), GateDecision::Allowed);
        assert_eq!(gate.remaining_today(&id), 2);
        assert_eq!(gate.metrics().corrupt_records(), 1);
    }

    #[test]
    fn test_read_failure_fails_open() {
        let clock = Arc::new(MockClock::new(noon(19)));
        let store = Arc::new(FailingStore::new());
        let gate = gate_with(store.clone(), clock);
        let id = gate.ensure_identity();

        for _ in 0..3 {
            gate.consume(&id);
        }
        store.fail_reads(true);

        // Count is unreadable, so the gate behaves as if nothing was used
        assert_eq!(gate.consume(&id), GateDecision::Allowed);
        assert_eq!(gate.remaining_today(&id), 3);
        assert!(gate.metrics().storage_errors() >= 1);
    }

    #[test]
    fn test_write_failure_still_returns_decision() {
        let clock = Arc::new(MockClock::new(noon(19)));
        let store = Arc::new(FailingStore::new());
        let gate = gate_with(store.clone(), clock);
        let id = gate.ensure_identity();

        store.fail_writes(true);
        assert_eq!(gate.consume(&id), GateDecision::Allowed);
        // The increment was lost
        assert_eq!(gate.remaining_today(&id), 3);
        assert_eq!(gate.metrics().storage_errors(), 1);
    }

    #[test]
    fn test_identity_read_failure_returns_temporary_identity() {
        let clock = Arc::new(MockClock::new(noon(19)));
        let store = Arc::new(FailingStore::new());
        let gate = gate_with(store.clone(), clock);
        let stored = gate.ensure_identity();

        store.fail_reads(true);
        let temporary = gate.ensure_identity();
        assert_ne!(temporary, stored);

        // The persisted identity survives the outage
        store.fail_reads(false);
        assert_eq!(gate.ensure_identity(), stored);
    }

    #[test]
    fn test_status_tracks_progress() {
        let (gate, _, clock) = memory_gate();
        let id = gate.ensure_identity();

        assert_eq!(gate.status(&id), GateStatus::new(0, 3));
        gate.consume(&id);
        gate.consume(&id);
        let status = gate.status(&id);
        assert_eq!(status.used, 2);
        assert_eq!(status.remaining, 1);

        clock.advance(Duration::days(1));
        assert_eq!(gate.status(&id).used, 0);
    }

    #[test]
    fn test_identities_are_counted_independently() {
        let (gate, _, _) = memory_gate();
        let a = AnonymousIdentity::parse("device_a").unwrap();
        let b = AnonymousIdentity::parse("device_b").unwrap();

        assert_eq!(gate.check_and_consume(&a, 1, noon(19)), GateDecision::Allowed);
        assert_eq!(gate.check_and_consume(&a, 1, noon(19)), GateDecision::Blocked);
        assert_eq!(gate.check_and_consume(&b, 1, noon(19)), GateDecision::Allowed);
    }

    #[test]
    fn test_metrics_count_decisions() {
        let (gate, _, _) = memory_gate();
        let id = gate.ensure_identity();

        for _ in 0..5 {
            gate.consume(&id);
        }

        let snapshot = gate.metrics().snapshot();
        assert_eq!(snapshot.attempts_allowed, 3);
        assert_eq!(snapshot.attempts_blocked, 2);
    }

    #[test]
    fn test_concurrent_consumers_never_exceed_threshold() {
        use std::thread;

        let (gate, _, _) = memory_gate();
        let id = gate.ensure_identity();
        let mut handles = vec![];

        for _ in 0..8 {
            let gate = gate.clone();
            let id = id.clone();
            handles.push(thread::spawn(move || {
                (0..25)
                    .filter(|_| gate.check_and_consume(&id, 50, noon(19)).is_allowed())
                    .count()
            }));
        }

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
        assert_eq!(gate.remaining(&id, 50, noon(19)), 0);
    }

    #[test]
    fn test_config_keys() {
        let config = GateConfig::default();
        let id = AnonymousIdentity::parse("device_x").unwrap();
        assert_eq!(config.identity_key(), "attempt-gate:device_id");
        assert_eq!(config.record_key(&id), "attempt-gate:attempts:device_x");
        assert_eq!(config.registered_key(), "attempt-gate:registered");
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: GateConfig = serde_json::from_str(r#"{"threshold":5}"#).unwrap();
        assert_eq!(config.threshold, 5);
        assert_eq!(config.key_prefix, DEFAULT_KEY_PREFIX);
        assert_eq!(config.identity_prefix, DEFAULT_IDENTITY_PREFIX);
    }
}
