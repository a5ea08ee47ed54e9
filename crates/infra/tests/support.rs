//! Shared wiring for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hauth_core::testing::FakeNetwork;
use hauth_core::{CredentialStore, KeyValueStore, RequestExecutor, RetryOrchestrator};
use hauth_infra::{JsonFileStore, ReqwestTransport};
use tempfile::TempDir;

/// A credential stack persisted to a JSON file in a temp dir, talking HTTP
/// through the real transport.
pub struct FileBackedClient {
    pub store: Arc<JsonFileStore>,
    pub credentials: Arc<CredentialStore>,
    pub network: Arc<FakeNetwork>,
    pub orchestrator: RetryOrchestrator,
    _dir: TempDir,
}

impl FileBackedClient {
    pub fn new(server: &str, serial: &str, password: Option<&str>) -> Self {
        let dir = TempDir::new().expect("temp dir should be created");
        let store = Arc::new(JsonFileStore::new(dir.path().join("hauth.json")));
        if let Some(password) = password {
            store.set("password", password).expect("seed password");
        }

        let credentials = Arc::new(CredentialStore::load(store.clone(), serial));
        credentials.update_server(server);

        let network = Arc::new(FakeNetwork::default());
        let executor =
            RequestExecutor::new(credentials.clone(), Arc::new(ReqwestTransport::new()), network.clone());

        Self {
            store,
            credentials,
            network,
            orchestrator: RetryOrchestrator::new(Arc::new(executor)),
            _dir: dir,
        }
    }
}

pub fn basic(login: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{login}:{password}")))
}
