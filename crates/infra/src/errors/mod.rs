//! Infrastructure error handling.

mod conversions;

pub use conversions::{map_io_error, InfraError};
