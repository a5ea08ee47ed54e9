//! Credential store
//!
//! Owns the login/password pair and the server endpoint for one device.
//! Every mutation takes the store's write lock and persists before the lock
//! is released, so the persisted slots never run ahead of or behind memory.
//! Persistence failures are logged and the store keeps working from memory.

use std::sync::Arc;

use hauth_domain::constants::{SLOT_LOGIN, SLOT_PASSWORD, SLOT_SERVER_URL};
use hauth_domain::{Credential, ServerEndpoint};
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use super::auth_header::basic_auth_header;
use crate::storage::KeyValueStore;

#[derive(Debug, Default)]
struct StoreState {
    credential: Credential,
    server: ServerEndpoint,
}

/// Shared, explicitly constructed credential holder
///
/// Build one per process at the composition root and hand out `Arc`s.
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
    serial: String,
    state: RwLock<StoreState>,
}

impl CredentialStore {
    /// Load credentials and endpoint from storage.
    ///
    /// Absent `server_url`/`password` slots are created empty, and an empty
    /// login is seeded from `serial` and persisted immediately.
    pub fn load(storage: Arc<dyn KeyValueStore>, serial: impl Into<String>) -> Self {
        let serial = serial.into();
        let store = Self { storage, serial, state: RwLock::new(StoreState::default()) };

        let login = store.read_slot(SLOT_LOGIN);
        let password = store.read_slot(SLOT_PASSWORD);
        let server = store.read_slot(SLOT_SERVER_URL);

        {
            let mut state = store.state.write();

            if server.is_none() {
                store.persist(SLOT_SERVER_URL, "");
            }
            if password.is_none() {
                store.persist(SLOT_PASSWORD, "");
            }

            state.credential.password = password.unwrap_or_default();
            state.server = ServerEndpoint::new(server.unwrap_or_default());
            state.credential.login = match login.filter(|l| !l.is_empty()) {
                Some(login) => login,
                None => {
                    store.persist(SLOT_LOGIN, &store.serial);
                    store.serial.clone()
                }
            };
        }

        debug!(
            login = %store.login(),
            password_empty = store.is_password_empty(),
            server = %store.server().base_url,
            "credentials.loaded"
        );
        store
    }

    /// Serial the login is derived from
    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn login(&self) -> String {
        self.state.read().credential.login.clone()
    }

    pub fn server(&self) -> ServerEndpoint {
        self.state.read().server.clone()
    }

    /// Login and password read together under one lock.
    pub fn credential(&self) -> Credential {
        self.state.read().credential.clone()
    }

    pub fn is_password_empty(&self) -> bool {
        self.state.read().credential.password.is_empty()
    }

    /// Recompute the login as `serial + suffix`, truncated to `max_length`
    /// characters, and persist it.
    ///
    /// With an empty serial this logs and returns the current login unchanged.
    pub fn init_login(&self, max_length: usize, suffix: &str) -> String {
        if self.serial.is_empty() {
            error!("credentials.invalid_serial");
            return self.login();
        }

        let mut login = format!("{}{}", self.serial, suffix);
        if login.chars().count() > max_length {
            warn!(max_length, "credentials.login_truncated");
            login = login.chars().take(max_length).collect();
        }

        let mut state = self.state.write();
        state.credential.login.clone_from(&login);
        self.persist(SLOT_LOGIN, &login);
        info!(login = %login, "credentials.login_initialised");
        login
    }

    /// Provision a password. Empty input is rejected without mutation.
    pub fn set_password(&self, password: &str) -> bool {
        if password.is_empty() {
            error!("credentials.invalid_password");
            return false;
        }
        self.write_password(password);
        true
    }

    /// Adopt a password rotated in by the server.
    ///
    /// Shares the lock with [`Self::set_password`] so the two never interleave.
    pub(crate) fn apply_rotated_password(&self, password: &str) {
        if password.is_empty() {
            return;
        }
        self.write_password(password);
        info!("credentials.password_rotated");
    }

    /// Basic-auth header for the current credential.
    ///
    /// If either field is empty in memory, the slots are re-read first so
    /// another instance's writes are picked up. Storage is never written here.
    pub fn auth_header(&self) -> String {
        let mut credential = self.credential();
        if credential.login.is_empty() || credential.password.is_empty() {
            credential = self.reload_empty_fields();
        }
        basic_auth_header(&credential.login, &credential.password)
    }

    /// Replace the server endpoint. Empty input is ignored with a warning.
    pub fn update_server(&self, url: &str) {
        if url.trim().is_empty() {
            warn!("credentials.empty_server_ignored");
            return;
        }

        let mut state = self.state.write();
        state.server = ServerEndpoint::new(url);
        self.persist(SLOT_SERVER_URL, url);
        info!(server = %url, "credentials.server_updated");
    }

    fn write_password(&self, password: &str) {
        let mut state = self.state.write();
        state.credential.password = password.to_string();
        self.persist(SLOT_PASSWORD, password);
    }

    fn reload_empty_fields(&self) -> Credential {
        let login = self.read_slot(SLOT_LOGIN).unwrap_or_default();
        let password = self.read_slot(SLOT_PASSWORD).unwrap_or_default();

        // Another writer may have filled a field since the snapshot; only
        // fields that are still empty take the stored value.
        let mut state = self.state.write();
        if state.credential.login.is_empty() && !login.is_empty() {
            state.credential.login = login;
        }
        if state.credential.password.is_empty() && !password.is_empty() {
            state.credential.password = password;
        }
        state.credential.clone()
    }

    fn read_slot(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(slot = key, error = %err, "credentials.storage_read_failed");
                None
            }
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(err) = self.storage.set(key, value) {
            error!(slot = key, error = %err, "credentials.storage_write_failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use hauth_domain::{HauthError, Result};

    use super::*;
    use crate::storage::InMemoryKeyValueStore;

    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(HauthError::Storage("denied".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(HauthError::Storage("denied".into()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(HauthError::Storage("denied".into()))
        }
    }

    fn store_with(slots: &[(&str, &str)], serial: &str) -> (Arc<InMemoryKeyValueStore>, CredentialStore) {
        let storage = Arc::new(InMemoryKeyValueStore::with_slots(slots.iter().copied()));
        let store = CredentialStore::load(storage.clone(), serial);
        (storage, store)
    }

    fn decode(header: &str) -> String {
        let encoded = header.strip_prefix("Basic ").unwrap();
        String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn first_load_seeds_login_and_empty_slots() {
        let (storage, store) = store_with(&[], "1234567890");

        assert_eq!(store.login(), "1234567890");
        assert!(store.is_password_empty());
        let slots = storage.snapshot();
        assert_eq!(slots.get(SLOT_LOGIN).map(String::as_str), Some("1234567890"));
        assert_eq!(slots.get(SLOT_PASSWORD).map(String::as_str), Some(""));
        assert_eq!(slots.get(SLOT_SERVER_URL).map(String::as_str), Some(""));
    }

    #[test]
    fn existing_slots_win_over_serial() {
        let (_, store) = store_with(
            &[(SLOT_LOGIN, "CUSTOM"), (SLOT_PASSWORD, "pw"), (SLOT_SERVER_URL, "https://a.example")],
            "1234567890",
        );

        assert_eq!(store.credential(), Credential::new("CUSTOM", "pw"));
        assert_eq!(store.server().base_url, "https://a.example");
    }

    #[test]
    fn init_login_truncates_to_max_length() {
        let (storage, store) = store_with(&[], "1234567890");

        assert_eq!(store.init_login(8, "-X"), "12345678");
        assert_eq!(storage.get(SLOT_LOGIN).unwrap().as_deref(), Some("12345678"));
    }

    #[test]
    fn init_login_truncation_holds_for_every_shorter_bound() {
        let (_, store) = store_with(&[], "1234567890");
        let full = "1234567890-X";

        for max in 0..full.len() {
            let login = store.init_login(max, "-X");
            assert_eq!(login.chars().count(), max);
            assert!(full.starts_with(&login));
        }
        assert_eq!(store.init_login(64, "-X"), full);
    }

    #[test]
    fn init_login_never_splits_a_code_point() {
        let (_, store) = store_with(&[], "ABCDE");
        assert_eq!(store.init_login(6, "éé"), "ABCDEé");
    }

    #[test]
    fn init_login_with_empty_serial_keeps_previous_login() {
        let (storage, store) = store_with(&[(SLOT_LOGIN, "PREVIOUS")], "");

        assert_eq!(store.init_login(8, "-X"), "PREVIOUS");
        assert_eq!(storage.get(SLOT_LOGIN).unwrap().as_deref(), Some("PREVIOUS"));
    }

    #[test]
    fn set_password_rejects_empty_input() {
        let (storage, store) = store_with(&[(SLOT_PASSWORD, "old")], "SERIAL");

        assert!(!store.set_password(""));
        assert_eq!(store.credential().password, "old");
        assert_eq!(storage.get(SLOT_PASSWORD).unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn set_password_is_reflected_in_header_and_storage() {
        let (storage, store) = store_with(&[], "SERIAL");

        assert!(store.set_password("abc"));
        assert_eq!(decode(&store.auth_header()), "SERIAL:abc");
        assert_eq!(storage.get(SLOT_PASSWORD).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn rotated_password_replaces_current_one() {
        let (storage, store) = store_with(&[(SLOT_PASSWORD, "old")], "SERIAL");

        store.apply_rotated_password("newpass");
        assert_eq!(store.credential().password, "newpass");
        assert_eq!(storage.get(SLOT_PASSWORD).unwrap().as_deref(), Some("newpass"));
    }

    #[test]
    fn auth_header_reloads_password_written_by_another_instance() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let first = CredentialStore::load(storage.clone(), "SERIAL");
        let second = CredentialStore::load(storage.clone(), "SERIAL");

        assert!(first.set_password("shared"));
        assert!(second.is_password_empty());
        assert_eq!(decode(&second.auth_header()), "SERIAL:shared");
        assert!(!second.is_password_empty());
    }

    #[test]
    fn auth_header_does_not_write_storage() {
        let (storage, store) = store_with(&[(SLOT_PASSWORD, "pw")], "SERIAL");
        let before = storage.snapshot();

        let _ = store.auth_header();
        assert_eq!(storage.snapshot(), before);
    }

    #[test]
    fn update_server_ignores_empty_url() {
        let (storage, store) = store_with(&[(SLOT_SERVER_URL, "https://a.example")], "SERIAL");

        store.update_server("");
        assert_eq!(store.server().base_url, "https://a.example");

        store.update_server("https://b.example");
        assert_eq!(store.server().base_url, "https://b.example");
        assert_eq!(storage.get(SLOT_SERVER_URL).unwrap().as_deref(), Some("https://b.example"));
    }

    #[test]
    fn broken_storage_degrades_to_memory() {
        let store = CredentialStore::load(Arc::new(BrokenStorage), "SERIAL");

        assert_eq!(store.login(), "SERIAL");
        assert!(store.set_password("pw"));
        assert_eq!(decode(&store.auth_header()), "SERIAL:pw");
    }

    #[test]
    fn concurrent_writers_leave_a_whole_password() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let store = Arc::new(CredentialStore::load(storage.clone(), "SERIAL"));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    for j in 0..50 {
                        let password = format!("pw-{i}-{j}");
                        if j % 2 == 0 {
                            assert!(store.set_password(&password));
                        } else {
                            store.apply_rotated_password(&password);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let password = store.credential().password;
        assert!(password.starts_with("pw-") && password.ends_with("-49"));
        assert_eq!(storage.get(SLOT_PASSWORD).unwrap().as_deref(), Some(password.as_str()));
    }
}
