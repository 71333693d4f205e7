//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of application logic.

pub mod clock;
pub mod identity;
pub mod layer;
pub mod store;

pub use clock::MockClock;
pub use identity::SequentialIdentitySource;
pub use layer::{CapturedEvent, MockCaptureLayer};
pub use store::FailingStore;
