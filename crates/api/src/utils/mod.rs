//! Utility helpers shared by the binary and the context.

pub mod logging;
