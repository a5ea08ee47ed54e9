//! Port interface for the shared local key-value storage
//!
//! The credential store and the identity cache only ever read and write
//! whole string slots, so the boundary is deliberately narrow.

use hauth_domain::Result;

/// String-keyed persistent storage.
///
/// Implementations must make a completed `set` visible to every later `get`
/// on the same instance, including from other threads.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `Ok(None)` means the slot was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, durably if the backend supports it.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing an absent slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
