//! # Hauth Domain
//!
//! Domain types shared by every Hauth crate.
//!
//! This crate contains:
//! - Credential, endpoint and request/outcome types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Storage slot names, wire header names and other constants
//!
//! ## Architecture
//! - No dependencies on other Hauth crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
