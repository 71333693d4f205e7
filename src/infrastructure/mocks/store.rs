//! Key-value store with switchable failures.

use crate::application::ports::{KeyValueStore, StorageError};
use crate::infrastructure::memory_store::MemoryStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory store whose reads and writes can be made to fail on demand.
///
/// Useful for exercising the gate's fail-open paths.
///
/// ```
/// use attempt_gate::infrastructure::mocks::FailingStore;
/// use attempt_gate::application::ports::KeyValueStore;
///
/// let store = FailingStore::new();
/// store.set("k", "v").unwrap();
///
/// store.fail_reads(true);
/// assert!(store.get("k").is_err());
///
/// store.fail_reads(false);
/// assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
/// ```
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failures: AtomicUsize,
}

impl FailingStore {
    /// Create a store that works until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `get` fail (or stop failing).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every `set` and `remove` fail (or stop failing).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of operations that were failed so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    /// The backing store, bypassing failure injection.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Unavailable(format!("injected {} failure", op)))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check(&self.fail_reads, "read")?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(&self.fail_writes, "write")?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check(&self.fail_writes, "write")?;
        self.inner.remove(key)
    }
}
