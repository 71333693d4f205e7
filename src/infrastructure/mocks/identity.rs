//! Deterministic identity source for testing.

use crate::application::ports::IdentitySource;
use crate::domain::identity::AnonymousIdentity;
use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out `<prefix>1`, `<prefix>2`, ... in order.
#[derive(Debug)]
pub struct SequentialIdentitySource {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdentitySource {
    /// Create a source starting at 1.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    /// Number of identities handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst) - 1
    }
}

impl IdentitySource for SequentialIdentitySource {
    fn generate(&self, _now: NaiveDateTime) -> AnonymousIdentity {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        AnonymousIdentity::from_token(format!("{}{}", self.prefix.trim(), n))
    }
}
