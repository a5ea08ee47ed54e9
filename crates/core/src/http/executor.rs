//! Authenticated request executor
//!
//! Assembles a fresh request for every attempt from the current credential
//! and server endpoint, sends it, adopts any rotated password carried by the
//! response, and classifies the status. Nothing here returns an error: every
//! failure becomes [`RequestOutcome::TransportError`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use hauth_domain::constants::{
    CONTENT_TYPE_JSON, DEFAULT_CONNECT_TIMEOUT_MS, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE,
    HEADER_NEXT_PASSWORD, HEADER_USER_AGENT, USER_AGENT_SUFFIX,
};
use hauth_domain::{ApiRequest, RequestOutcome, Result};
use tracing::{debug, error, info, warn};

use super::classifier::classify;
use super::ports::{Connection, NetworkMonitor, PreparedRequest, Transport};
use super::url_builder::build_url;
use crate::credentials::CredentialStore;

/// Platform user agent followed by `suffix`.
pub fn default_user_agent(suffix: &str) -> String {
    format!(
        "hauth/{} ({}; {}) {suffix}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Result of one attempt: its classification, the raw status, and the open
/// connection when a response arrived.
pub struct Exchange {
    pub outcome: RequestOutcome,
    pub status: Option<u16>,
    connection: Option<Box<dyn Connection>>,
}

impl Exchange {
    fn transport_error() -> Self {
        Self { outcome: RequestOutcome::TransportError, status: None, connection: None }
    }

    pub fn connection(&self) -> Option<&dyn Connection> {
        self.connection.as_deref()
    }

    /// Move the open connection out, leaving the exchange without one.
    pub fn take_connection(&mut self) -> Option<Box<dyn Connection>> {
        self.connection.take()
    }

    /// Release the connection, if still held.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.disconnect();
        }
    }
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("outcome", &self.outcome)
            .field("status", &self.status)
            .field("connected", &self.connection.is_some())
            .finish()
    }
}

/// Sends authenticated requests against the stored server endpoint
pub struct RequestExecutor {
    credentials: Arc<CredentialStore>,
    transport: Arc<dyn Transport>,
    network: Arc<dyn NetworkMonitor>,
    connect_timeout: Duration,
    user_agent: String,
}

impl RequestExecutor {
    pub fn new(
        credentials: Arc<CredentialStore>,
        transport: Arc<dyn Transport>,
        network: Arc<dyn NetworkMonitor>,
    ) -> Self {
        Self {
            credentials,
            transport,
            network,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            user_agent: default_user_agent(USER_AGENT_SUFFIX),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Assemble the request from the current endpoint and credential.
    ///
    /// # Errors
    /// Returns `HauthError::Config` if the stored server URL is unusable.
    pub fn prepare(&self, request: &ApiRequest) -> Result<PreparedRequest> {
        let server = self.credentials.server();
        let url = build_url(&server.base_url, &request.route, &request.query)?;

        let headers = vec![
            (HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string()),
            (HEADER_USER_AGENT.to_string(), self.user_agent.clone()),
            (HEADER_AUTHORIZATION.to_string(), self.credentials.auth_header()),
        ];

        let body = if request.method.sends_body() { request.body.clone() } else { None };

        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body,
            connect_timeout: self.connect_timeout,
        })
    }

    /// Run one attempt.
    pub fn execute(&self, request: &ApiRequest) -> Exchange {
        if !self.network.is_connected() {
            error!(route = %request.route, "http.no_connection");
            return Exchange::transport_error();
        }

        let prepared = match self.prepare(request) {
            Ok(prepared) => prepared,
            Err(err) => {
                error!(route = %request.route, error = %err, "http.prepare_failed");
                return Exchange::transport_error();
            }
        };
        // Sampled after the header was built so it matches what was sent.
        let password_empty = self.credentials.is_password_empty();

        info!(method = %prepared.method, url = %prepared.url, "http.request");
        let started = Instant::now();

        let connection = match self.transport.send(&prepared) {
            Ok(connection) => connection,
            Err(err) => {
                error!(
                    method = %prepared.method,
                    url = %prepared.url,
                    error = %err,
                    "http.transport_failed"
                );
                return Exchange::transport_error();
            }
        };

        let status = connection.status();
        if let Some(next) = connection.header(HEADER_NEXT_PASSWORD).filter(|p| !p.is_empty()) {
            self.credentials.apply_rotated_password(&next);
        }

        let outcome = classify(status, password_empty);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match outcome {
            RequestOutcome::Success(_) => debug!(status, elapsed_ms, "http.response"),
            RequestOutcome::MissingCredential => {
                warn!(status, elapsed_ms, "http.password_missing");
            }
            RequestOutcome::InvalidCredential => {
                warn!(status, elapsed_ms, "http.password_invalid");
            }
            RequestOutcome::OtherHttpStatus(_) | RequestOutcome::TransportError => {
                warn!(status, elapsed_ms, "http.response");
            }
        }

        Exchange { outcome, status: Some(status), connection: Some(connection) }
    }
}
