//! Login/password state and the basic-auth header built from it

pub mod auth_header;
pub mod store;

pub use auth_header::basic_auth_header;
pub use store::CredentialStore;
