//! # Hauth application
//!
//! Composition root and command-line front end.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - CLI commands over the context
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the infrastructure adapters into the core services

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::{parse_args, run_command, Command};
pub use context::*;
