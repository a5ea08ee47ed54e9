//! Authenticated HTTP calls: URL assembly, execution, classification, retry

pub mod classifier;
pub mod executor;
pub mod ports;
pub mod retry;
pub mod url_builder;

pub use classifier::classify;
pub use executor::{default_user_agent, Exchange, RequestExecutor};
pub use ports::{Connection, NetworkMonitor, PreparedRequest, Transport};
pub use retry::{CallResponse, RetryOrchestrator};
pub use url_builder::build_url;
