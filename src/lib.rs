//! # attempt-gate
//!
//! Day-bucketed attempt limiting for anonymous installations.
//!
//! This crate decides whether a rate-limited action may run for an anonymous
//! device identity and records that it did. Each identity gets a fixed number
//! of attempts per calendar day; the allowance comes back on the first check
//! after midnight, or immediately when the installation completes signup.
//!
//! ## Quick Start
//!
//! ```rust
//! use attempt_gate::{AttemptGate, GateDecision};
//!
//! // Sensible defaults: 3 attempts per day, in-memory store, system clock
//! let gate = AttemptGate::builder().build().unwrap();
//!
//! // Call on screen mount; the identity is created once and then reused
//! let identity = gate.ensure_identity();
//!
//! // Call before each rate-limited action
//! match gate.consume(&identity) {
//!     GateDecision::Allowed => { /* run the analysis */ }
//!     GateDecision::Blocked => { /* offer signup */ }
//! }
//!
//! // For progress display
//! let status = gate.status(&identity);
//! println!("{} attempts remaining today", status.remaining);
//! ```
//!
//! ## Check-then-increment
//!
//! `check_and_consume` compares the stored count with the threshold *before*
//! incrementing. A blocked call never changes the stored count, so a caller
//! that ignores `Blocked` and proceeds anyway cannot push the record past the
//! threshold. At most `threshold` attempts are counted per identity per day.
//!
//! ```rust
//! # use attempt_gate::{AttemptGate, GateDecision};
//! # use chrono::NaiveDate;
//! let gate = AttemptGate::builder().build().unwrap();
//! let id = gate.ensure_identity();
//! let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//! let morning = day.and_hms_opt(9, 0, 0).unwrap();
//! let next_morning = day.succ_opt().unwrap().and_hms_opt(9, 0, 0).unwrap();
//!
//! for _ in 0..3 {
//!     assert_eq!(gate.check_and_consume(&id, 3, morning), GateDecision::Allowed);
//! }
//! assert_eq!(gate.check_and_consume(&id, 3, morning), GateDecision::Blocked);
//!
//! // A new calendar day restores the full allowance
//! assert_eq!(gate.remaining(&id, 3, next_morning), 3);
//! assert_eq!(gate.check_and_consume(&id, 3, next_morning), GateDecision::Allowed);
//! ```
//!
//! ## Signup unlock
//!
//! `SignupGate` layers a registration bypass on top of the counter. Once
//! signup completes the count is reset and the installation is never blocked
//! again:
//!
//! ```rust
//! # use attempt_gate::{AttemptGate, SignupGate};
//! let signup = SignupGate::new(AttemptGate::builder().build().unwrap());
//! let id = signup.gate().ensure_identity();
//!
//! signup.complete_signup(&id);
//! assert!(signup.is_registered());
//! assert!(signup.check(&id).is_allowed());
//! ```
//!
//! ## Storage
//!
//! The gate talks to storage through the `KeyValueStore` port:
//! - `MemoryStore`: DashMap-backed, for tests and short-lived processes
//! - `FileStore`: a JSON file replaced atomically on every write
//! - `RedisStore`: shared Redis strings (feature `redis-storage`)
//!
//! ```rust,no_run
//! # use attempt_gate::{AttemptGate, FileStore};
//! let store = FileStore::open("/var/lib/myapp/attempts.json").unwrap();
//! let gate = AttemptGate::builder().with_store(store).build().unwrap();
//! ```
//!
//! ## Fail-Open Operation
//!
//! The gate is a soft friction mechanism, not an access-control boundary.
//! No gate operation returns an error:
//! - Unreadable or corrupt records read as zero attempts used
//! - Failed writes are logged and the computed decision is still returned
//! - If the identity cannot be read, a temporary one is used for that call
//!
//! Every absorbed failure is logged with `tracing::warn!` and counted:
//!
//! ```rust
//! # use attempt_gate::AttemptGate;
//! # let gate = AttemptGate::builder().build().unwrap();
//! let snapshot = gate.metrics().snapshot();
//! println!("Allowed: {}", snapshot.attempts_allowed);
//! println!("Blocked: {}", snapshot.attempts_blocked);
//! println!("Storage errors: {}", snapshot.storage_errors);
//! println!("Block rate: {:.2}%", snapshot.block_rate() * 100.0);
//! ```
//!
//! ## Voice score
//!
//! `VoiceScore` is the mocked score the gated action produces. It draws from
//! an injected `rand::Rng`, so it is deterministic under a seeded generator.
//! `VoicePrompts` picks the line to read aloud the same way, per language
//! code with an English fallback.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    decision::{GateDecision, GateStatus},
    identity::AnonymousIdentity,
    prompt::VoicePrompts,
    record::{AttemptRecord, RecordError},
    score::{ScoreTier, VoiceScore},
};

pub use application::{
    gate::{AttemptGate, GateConfig},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, IdentitySource, KeyValueStore, StorageError},
    signup::SignupGate,
};

pub use infrastructure::{
    builder::{AttemptGateBuilder, BuildError},
    clock::SystemClock,
    file_store::FileStore,
    identity::RandomIdentitySource,
    memory_store::MemoryStore,
};

#[cfg(feature = "redis-storage")]
pub use infrastructure::redis_store::{RedisStore, RedisStoreConfig};
