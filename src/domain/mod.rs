//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the attempt gate:
//! - Anonymous device identities
//! - Day-bucketed attempt records
//! - Gate decisions and status snapshots
//! - The mocked voice score generator and its read-aloud prompts
//!
//! All types in this layer are pure and easily testable.

pub mod decision;
pub mod identity;
pub mod prompt;
pub mod record;
pub mod score;
