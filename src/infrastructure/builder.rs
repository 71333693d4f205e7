//! Builder wiring the attempt gate to its adapters.
//!
//! Anything not configured explicitly falls back to a default adapter:
//! `SystemClock`, an in-memory `MemoryStore`, and a `RandomIdentitySource`
//! using the configured identity prefix.

use crate::application::{
    gate::{AttemptGate, GateConfig},
    ports::{Clock, IdentitySource, KeyValueStore},
};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::identity::RandomIdentitySource;
use crate::infrastructure::memory_store::MemoryStore;
use std::sync::Arc;

/// Error returned when building an `AttemptGate` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Key prefix must not be empty, or keys would collide with other data
    EmptyKeyPrefix,
    /// Identity prefix must not contain whitespace
    InvalidIdentityPrefix(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::EmptyKeyPrefix => write!(f, "key_prefix must not be empty"),
            BuildError::InvalidIdentityPrefix(prefix) => {
                write!(f, "identity_prefix must not contain whitespace: {:?}", prefix)
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Builder for constructing an `AttemptGate`.
#[derive(Default)]
pub struct AttemptGateBuilder {
    config: GateConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    identities: Option<Arc<dyn IdentitySource>>,
}

impl AttemptGateBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of attempts allowed per identity per day.
    ///
    /// Zero is valid and blocks every attempt.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the prefix for every storage key.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Set the prefix for generated identities.
    ///
    /// Ignored when a custom identity source is supplied.
    pub fn with_identity_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.identity_prefix = prefix.into();
        self
    }

    /// Use a specific key-value store.
    ///
    /// Pass an `Arc` to keep a handle to the store after building.
    pub fn with_store<S>(mut self, store: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use a custom clock (useful for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use a custom identity source.
    pub fn with_identity_source<I>(mut self, source: I) -> Self
    where
        I: IdentitySource + 'static,
    {
        self.identities = Some(Arc::new(source));
        self
    }

    /// Build the gate.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build(self) -> Result<AttemptGate, BuildError> {
        if self.config.key_prefix.is_empty() {
            return Err(BuildError::EmptyKeyPrefix);
        }
        if self.identities.is_none()
            && self.config.identity_prefix.chars().any(char::is_whitespace)
        {
            return Err(BuildError::InvalidIdentityPrefix(
                self.config.identity_prefix,
            ));
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let identities = match self.identities {
            Some(identities) => identities,
            None => Arc::new(RandomIdentitySource::new(
                self.config.identity_prefix.clone(),
            )),
        };

        Ok(AttemptGate::new(store, clock, identities, self.config))
    }
}

impl AttemptGate {
    /// Create a builder for configuring the gate.
    ///
    /// # Example
    /// ```
    /// use attempt_gate::AttemptGate;
    ///
    /// let gate = AttemptGate::builder()
    ///     .with_threshold(5)
    ///     .with_key_prefix("voice-crush:")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(gate.threshold(), 5);
    /// ```
    pub fn builder() -> AttemptGateBuilder {
        AttemptGateBuilder::new()
    }
}
