//! Credential and endpoint types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Login/password pair presented to the server with basic authentication.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub login: String,
    pub password: String,
}

impl Credential {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self { login: login.into(), password: password.into() }
    }

    /// True until a password has been provisioned or rotated in.
    pub fn is_password_empty(&self) -> bool {
        self.password.is_empty()
    }
}

// Passwords never reach logs through `{:?}`.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("login", &self.login)
            .field("password", &if self.password.is_empty() { "<empty>" } else { "<redacted>" })
            .finish()
    }
}

/// Base URL every authenticated route is joined onto.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    pub base_url: String,
}

impl ServerEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}
