//! Gate decisions and status snapshots.

/// Decision returned by the gate for a single check.
///
/// Decisions are transient and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The attempt may proceed; it has been counted
    Allowed,
    /// The daily allowance is used up; nothing was counted
    Blocked,
}

impl GateDecision {
    /// Check if this decision is Allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }

    /// Check if this decision is Blocked.
    pub fn is_blocked(&self) -> bool {
        matches!(self, GateDecision::Blocked)
    }
}

/// Point-in-time view of an identity's allowance for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateStatus {
    /// Attempts consumed in the current window
    pub used: u32,
    /// Attempts allowed per window
    pub threshold: u32,
    /// Attempts still available in the current window
    pub remaining: u32,
}

impl GateStatus {
    /// Build a status from a used count and a threshold.
    pub fn new(used: u32, threshold: u32) -> Self {
        Self {
            used,
            threshold,
            remaining: threshold.saturating_sub(used),
        }
    }

    /// True when the next check would be blocked.
    pub fn is_blocked(&self) -> bool {
        self.remaining == 0
    }

    /// Fraction of the allowance consumed, clamped to `0.0..=1.0`.
    ///
    /// A zero threshold reports as fully used.
    pub fn progress(&self) -> f64 {
        if self.threshold == 0 {
            1.0
        } else {
            (self.used.min(self.threshold) as f64) / (self.threshold as f64)
        }
    }
}
