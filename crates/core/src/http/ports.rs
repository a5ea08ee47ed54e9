//! Port interfaces for the HTTP transport and network reachability
//!
//! The transport is blocking: `send` returns once the status line and
//! headers are available, leaving the body on the open connection.

use std::fmt;
use std::time::Duration;

use hauth_domain::constants::HEADER_AUTHORIZATION;
use hauth_domain::{HttpMethod, Result};
use url::Url;

/// Fully assembled request, rebuilt from scratch for every attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// Present only for methods that send a body.
    pub body: Option<String>,
    pub connect_timeout: Duration,
}

impl PreparedRequest {
    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                if key.eq_ignore_ascii_case(HEADER_AUTHORIZATION) {
                    (key.as_str(), "<redacted>")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("PreparedRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(String::len))
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Open response from one round trip.
///
/// Dropping a connection releases it; [`Connection::disconnect`] does the
/// same explicitly.
pub trait Connection: Send {
    fn status(&self) -> u16;

    /// Response header value, looked up case-insensitively.
    fn header(&self, name: &str) -> Option<String>;

    /// Declared `Content-Length`, if the server sent one.
    fn content_length(&self) -> Option<u64>;

    /// Read the remaining body, concatenating its lines.
    fn read_body(&mut self) -> Result<String>;

    fn disconnect(self: Box<Self>);
}

/// Sends prepared requests
pub trait Transport: Send + Sync {
    /// Connect, write the body if any, and read the response head.
    ///
    /// # Errors
    /// Any connect, write or read failure.
    fn send(&self, request: &PreparedRequest) -> Result<Box<dyn Connection>>;
}

/// Reports whether any network is currently usable
pub trait NetworkMonitor: Send + Sync {
    fn is_connected(&self) -> bool;
}
