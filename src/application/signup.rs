//! Signup unlock layered on top of the attempt gate.
//!
//! Anonymous installations get the gate's daily allowance. Once signup
//! completes, the installation is flagged as registered and is never
//! blocked again.

use crate::application::gate::AttemptGate;
use crate::domain::{
    decision::{GateDecision, GateStatus},
    identity::AnonymousIdentity,
};
use tracing::{info, warn};

const REGISTERED: &str = "true";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registration {
    Registered,
    Anonymous,
    Unknown,
}

/// Attempt gate with a registration bypass.
#[derive(Debug, Clone)]
pub struct SignupGate {
    gate: AttemptGate,
}

impl SignupGate {
    /// Wrap an attempt gate.
    pub fn new(gate: AttemptGate) -> Self {
        Self { gate }
    }

    /// The wrapped gate.
    pub fn gate(&self) -> &AttemptGate {
        &self.gate
    }

    /// Decide whether `identity` may run another attempt.
    ///
    /// Registered installations are always allowed and nothing is counted.
    /// If the registration flag cannot be read the check also fails open.
    pub fn check(&self, identity: &AnonymousIdentity) -> GateDecision {
        match self.registration() {
            Registration::Registered | Registration::Unknown => GateDecision::Allowed,
            Registration::Anonymous => self.gate.consume(identity),
        }
    }

    /// Record a completed signup and clear the attempt count.
    pub fn complete_signup(&self, identity: &AnonymousIdentity) {
        let key = self.gate.config().registered_key();
        if let Err(e) = self.gate.store().set(&key, REGISTERED) {
            warn!(error = %e, identity = %identity, "Failed to persist registration flag");
            self.gate.metrics().record_storage_error();
        }
        self.gate.reset(identity);
        info!(identity = %identity, "Signup completed, attempts unlocked");
    }

    /// Whether this installation has completed signup.
    pub fn is_registered(&self) -> bool {
        self.registration() == Registration::Registered
    }

    /// Progress view for display; `None` when there is no limit to show.
    pub fn status(&self, identity: &AnonymousIdentity) -> Option<GateStatus> {
        match self.registration() {
            Registration::Anonymous => Some(self.gate.status(identity)),
            Registration::Registered | Registration::Unknown => None,
        }
    }

    fn registration(&self) -> Registration {
        let key = self.gate.config().registered_key();
        match self.gate.store().get(&key) {
            Ok(Some(value)) if value == REGISTERED => Registration::Registered,
            Ok(_) => Registration::Anonymous,
            Err(e) => {
                warn!(error = %e, "Failed to read registration flag");
                self.gate.metrics().record_storage_error();
                Registration::Unknown
            }
        }
    }
}
