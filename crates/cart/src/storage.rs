//! The persistence seam for the cart mapping.
//!
//! Models the browser's local key-value store: one string value per key,
//! synchronous, infallible from the caller's point of view. Each
//! storefront brand uses a single key holding the JSON-serialized cart
//! mapping.

use std::collections::HashMap;

/// A synchronous string key-value store.
pub trait CartStorage {
    /// Read the value under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);

    /// Delete the value under `key`. Deleting a missing key is a no-op.
    fn remove(&mut self, key: &str);
}

/// In-memory storage, used in tests and anywhere no durable store exists.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl CartStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}
