//! # Hauth Infrastructure
//!
//! Infrastructure implementations of the `hauth-core` ports.
//!
//! This crate contains:
//! - Key-value storage backends (JSON file, system keyring)
//! - The blocking HTTP transport
//! - The external identity-probe command runner
//! - Linux sysfs readers for device metadata and link state
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `hauth-core`
//! - Contains all "impure" code (file, process, network and platform I/O)

pub mod config;
pub mod errors;
pub mod http;
pub mod platform;
pub mod process;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{ReqwestConnection, ReqwestTransport};
pub use platform::{SysfsDeviceInfo, SysfsNetworkMonitor};
pub use process::CommandProber;
pub use storage::{open_store, JsonFileStore, KeyringStore};
