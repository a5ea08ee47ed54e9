//! Process-local key-value store
//!
//! Used when no persistent backend is available and as a fixture in tests.

use std::collections::HashMap;

use hauth_domain::Result;
use parking_lot::RwLock;

use super::ports::KeyValueStore;

/// Key-value slots held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    slots: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with the given slots.
    pub fn with_slots<I, K, V>(slots: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let slots = slots.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { slots: RwLock::new(slots) }
    }

    /// Copy of every slot, for assertions.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.slots.read().clone()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.write().remove(key);
        Ok(())
    }
}
