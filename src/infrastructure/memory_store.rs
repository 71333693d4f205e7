//! In-memory key-value store.
//!
//! Backed by DashMap, so it is safe to share between threads. Contents are
//! lost when the process exits; use `FileStore` for durable state.

use crate::application::ports::{KeyValueStore, StorageError};
use dashmap::DashMap;

/// Thread-safe in-memory store backed by DashMap.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    /// Check if a key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.map.clear();
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        let copy = Self::new();
        for entry in self.map.iter() {
            copy.map.insert(entry.key().clone(), entry.value().clone());
        }
        copy
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.get(key).map(|value| value.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.map.remove(key);
        Ok(())
    }
}
