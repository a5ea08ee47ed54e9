//! Shared test helpers for `hauth-core` integration tests.
//!
//! Wires the core services over in-memory storage and scripted ports so the
//! scenarios below read like a device talking to its server.

#![allow(dead_code)]

use std::sync::Arc;

use hauth_core::testing::{FakeDevice, FakeNetwork, ScriptedProbe, ScriptedTransport};
use hauth_core::{
    CredentialStore, DeviceIdentityResolver, InMemoryKeyValueStore, RequestExecutor,
    RetryOrchestrator,
};
use hauth_domain::constants::SLOT_SERVER_URL;

pub const SERVER: &str = "https://fleet.example.com/api";

/// One simulated device process.
pub struct Device {
    pub storage: Arc<InMemoryKeyValueStore>,
    pub credentials: Arc<CredentialStore>,
    pub transport: Arc<ScriptedTransport>,
    pub network: Arc<FakeNetwork>,
    pub orchestrator: RetryOrchestrator,
}

/// Boot a device against `storage`, resolving its serial through `probe`.
pub fn boot(
    storage: Arc<InMemoryKeyValueStore>,
    device: FakeDevice,
    probe: Arc<ScriptedProbe>,
    transport: ScriptedTransport,
) -> Device {
    let resolver = DeviceIdentityResolver::new(Arc::new(device), probe);
    let serial = resolver.resolve_persisted(storage.as_ref());

    let credentials = Arc::new(CredentialStore::load(storage.clone(), serial));
    if credentials.server().base_url.is_empty() {
        credentials.update_server(SERVER);
    }

    let transport = Arc::new(transport);
    let network = Arc::new(FakeNetwork::default());
    let executor = RequestExecutor::new(credentials.clone(), transport.clone(), network.clone());

    Device {
        storage,
        credentials,
        transport,
        network,
        orchestrator: RetryOrchestrator::new(Arc::new(executor)),
    }
}

/// Fresh storage with the server already configured.
pub fn provisioned_storage() -> Arc<InMemoryKeyValueStore> {
    Arc::new(InMemoryKeyValueStore::with_slots([(SLOT_SERVER_URL, SERVER)]))
}
