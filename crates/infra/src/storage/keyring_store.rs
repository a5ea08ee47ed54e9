//! System keyring backend
//!
//! Each slot is one keyring entry under the configured service name.

use std::collections::HashMap;

use hauth_core::KeyValueStore;
use hauth_domain::Result;
use keyring::Entry;
use parking_lot::Mutex;

use crate::errors::InfraError;

/// [`KeyValueStore`] backed by the platform credential store
pub struct KeyringStore {
    service: String,
    entries: Mutex<HashMap<String, Entry>>,
}

impl KeyringStore {
    pub fn new(service: &str) -> Self {
        Self { service: service.to_string(), entries: Mutex::new(HashMap::new()) }
    }

    fn with_entry<T>(
        &self,
        key: &str,
        op: impl FnOnce(&Entry) -> keyring::Result<T>,
    ) -> keyring::Result<T> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(key) {
            let entry = Entry::new(&self.service, key)?;
            entries.insert(key.to_string(), entry);
        }
        match entries.get(key) {
            Some(entry) => op(entry),
            None => Err(keyring::Error::NoEntry),
        }
    }
}

impl std::fmt::Debug for KeyringStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringStore").field("service", &self.service).finish_non_exhaustive()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.with_entry(key, Entry::get_password) {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entry(key, |entry| entry.set_password(value))
            .map_err(|err| InfraError::from(err).into())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.with_entry(key, Entry::delete_credential) {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}
