//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::identity::AnonymousIdentity;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Error reported by a key-value store adapter.
#[derive(Debug)]
pub enum StorageError {
    /// The backend cannot be reached or refused the operation
    Unavailable(String),
    /// Filesystem failure
    Io(std::io::Error),
    /// The backend's own data could not be encoded or decoded
    Serialization(serde_json::Error),
    /// Redis command or connection failure
    #[cfg(feature = "redis-storage")]
    Redis(redis::RedisError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(reason) => write!(f, "storage unavailable: {}", reason),
            StorageError::Io(e) => write!(f, "storage I/O error: {}", e),
            StorageError::Serialization(e) => write!(f, "storage serialization error: {}", e),
            #[cfg(feature = "redis-storage")]
            StorageError::Redis(e) => write!(f, "redis error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Unavailable(_) => None,
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(e) => Some(e),
            #[cfg(feature = "redis-storage")]
            StorageError::Redis(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e)
    }
}

#[cfg(feature = "redis-storage")]
impl From<redis::RedisError> for StorageError {
    fn from(e: redis::RedisError) -> Self {
        StorageError::Redis(e)
    }
}

/// Port for durable, per-installation key-value storage.
///
/// Values are plain strings. Implementations must survive process restarts
/// to give the gate its day-long memory; the in-memory adapter is meant for
/// tests and short-lived processes.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T> KeyValueStore for Arc<T>
where
    T: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Port for obtaining the current wall-clock time.
///
/// Day boundaries are taken from this clock, so the time it reports should be
/// the local time of the installation.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Get the current calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Port for minting new anonymous identities.
///
/// Infrastructure provides `RandomIdentitySource`; tests can inject a
/// deterministic source.
pub trait IdentitySource: Send + Sync + Debug {
    /// Generate a fresh identity. `now` may be mixed into the token.
    fn generate(&self, now: NaiveDateTime) -> AnonymousIdentity;
}
