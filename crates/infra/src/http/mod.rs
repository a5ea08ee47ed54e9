//! HTTP transport over `reqwest`'s blocking client.

mod transport;

pub use transport::{ReqwestConnection, ReqwestTransport};
