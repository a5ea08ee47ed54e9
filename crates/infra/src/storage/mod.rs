//! Key-value storage backends for the credential slots.

mod file_store;
mod keyring_store;

use std::sync::Arc;

use hauth_core::{InMemoryKeyValueStore, KeyValueStore};
use hauth_domain::{StorageBackend, StorageConfig};

pub use self::file_store::JsonFileStore;
pub use self::keyring_store::KeyringStore;

/// Open the backend selected by `config`.
///
/// Backends open lazily; access failures surface on first read or write.
pub fn open_store(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    tracing::debug!(backend = ?config.backend, "storage.opening");
    match config.backend {
        StorageBackend::File => Arc::new(JsonFileStore::new(&config.path)),
        StorageBackend::Keyring => Arc::new(KeyringStore::new(&config.service)),
        StorageBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
    }
}
