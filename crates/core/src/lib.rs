//! # Hauth Core
//!
//! Credential lifecycle logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Device identity resolution behind probe/device ports
//! - The credential store and basic-auth header builder
//! - Authenticated request execution, outcome classification and the
//!   one-shot retry protocol
//!
//! ## Architecture Principles
//! - Only depends on `hauth-domain`
//! - No filesystem, HTTP, process or platform code
//! - All external collaborators via traits
//! - Synchronous and blocking; callers choose the thread

pub mod credentials;
pub mod http;
pub mod identity;
pub mod storage;
pub mod testing;

// Re-export specific items to avoid ambiguity
pub use credentials::{basic_auth_header, CredentialStore};
pub use http::{
    build_url, classify, default_user_agent, CallResponse, Connection, Exchange, NetworkMonitor,
    PreparedRequest, RequestExecutor, RetryOrchestrator, Transport,
};
pub use identity::{
    validate_builtin_serial, DeviceIdentityResolver, DeviceInfoProvider, IdentityProbe,
};
pub use storage::{InMemoryKeyValueStore, KeyValueStore};
