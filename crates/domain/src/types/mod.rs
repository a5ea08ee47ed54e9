//! Domain types and models

pub mod credential;
pub mod outcome;
pub mod request;

pub use credential::{Credential, ServerEndpoint};
pub use outcome::{CallOutcome, RequestOutcome, RetryState};
pub use request::{ApiRequest, HttpMethod, QueryParams};
