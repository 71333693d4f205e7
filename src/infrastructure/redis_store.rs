//! Redis-backed key-value store.
//!
//! Lets several processes on one host (or a small fleet sharing a device
//! database) read the same identity and attempt records. Values are stored
//! as plain Redis strings without expiry: identities must persist
//! indefinitely, and attempt records roll over by date rather than by TTL.
//!
//! ## Sync bridge
//!
//! The `KeyValueStore` port is synchronous. Inside a multi-threaded tokio
//! runtime, commands run via `block_in_place`; outside any runtime a
//! temporary current-thread runtime is created per call. Inside a
//! current-thread runtime every command fails with
//! `StorageError::Unavailable`, which the gate absorbs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use attempt_gate::{AttemptGate, RedisStore, RedisStoreConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = RedisStore::connect("redis://127.0.0.1/")
//!         .await
//!         .expect("Failed to connect to Redis");
//!
//!     let gate = AttemptGate::builder().with_store(store).build().unwrap();
//! }
//! ```

use crate::application::ports::{KeyValueStore, StorageError};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::fmt;
use std::future::Future;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Configuration for Redis storage.
#[derive(Debug, Clone, Default)]
pub struct RedisStoreConfig {
    /// Namespace prepended to every key, on top of the gate's own prefix
    pub namespace: String,
}

/// Redis-backed store.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to Redis with default configuration.
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect(url: &str) -> Result<Self, RedisError> {
        Self::connect_with_config(url, RedisStoreConfig::default()).await
    }

    /// Connect to Redis with custom configuration.
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect_with_config(
        url: &str,
        config: RedisStoreConfig,
    ) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self { connection, config })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.config.namespace, key)
    }
}

/// Drive a Redis command to completion from synchronous code.
///
/// `block_in_place` is only legal on a multi-threaded runtime. On a
/// current-thread runtime the only worker is the caller, so the connection
/// could never make progress; the command is refused instead and the gate
/// fails open.
fn block_on_command<F, T>(command: F) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, RedisError>>,
{
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(command))
                    .map_err(StorageError::from)
            }
            _ => Err(StorageError::Unavailable(
                "redis store needs a multi-threaded tokio runtime".to_string(),
            )),
        },
        Err(_) => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(command).map_err(StorageError::from)
        }
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = self.key(key);
        let mut conn = self.connection.clone();
        block_on_command(async move { conn.get::<_, Option<String>>(&key).await })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let key = self.key(key);
        let value = value.to_string();
        let mut conn = self.connection.clone();
        block_on_command(async move { conn.set::<_, _, ()>(&key, value).await })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let key = self.key(key);
        let mut conn = self.connection.clone();
        block_on_command(async move { conn.del::<_, ()>(&key).await })
    }
}
