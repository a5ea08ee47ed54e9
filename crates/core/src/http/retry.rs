//! One-shot retry on authentication failure
//!
//! `Initial` → one attempt. A `MissingCredential` or `InvalidCredential`
//! outcome disposes of that connection, rebuilds the request from whatever
//! credential is current (possibly just rotated in by the failed response)
//! and sends exactly once more, moving to `Retried`. The second attempt's raw
//! status is reported as-is, without classification or further retry.

use std::fmt;
use std::sync::Arc;

use hauth_domain::{ApiRequest, CallOutcome, HauthError, Result};
use tracing::{debug, warn};

use super::executor::RequestExecutor;
use super::ports::Connection;

/// What one logical call hands back: its outcome and, when a response
/// arrived, the live connection to read it from.
pub struct CallResponse {
    outcome: CallOutcome,
    connection: Option<Box<dyn Connection>>,
}

impl CallResponse {
    pub fn outcome(&self) -> CallOutcome {
        self.outcome
    }

    /// Status of the response held by this call, if any.
    pub fn status(&self) -> Option<u16> {
        self.outcome.status()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.connection.as_ref().and_then(|connection| connection.header(name))
    }

    pub fn content_length(&self) -> Option<u64> {
        self.connection.as_ref().and_then(|connection| connection.content_length())
    }

    /// Read the response body.
    ///
    /// # Errors
    /// Returns `HauthError::Transport` when no response is held or the read fails.
    pub fn read_body(&mut self) -> Result<String> {
        match self.connection.as_mut() {
            Some(connection) => connection.read_body(),
            None => Err(HauthError::Transport("no response to read".into())),
        }
    }

    /// Release the connection.
    pub fn disconnect(mut self) {
        if let Some(connection) = self.connection.take() {
            connection.disconnect();
        }
    }
}

impl fmt::Debug for CallResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallResponse")
            .field("outcome", &self.outcome)
            .field("connected", &self.connection.is_some())
            .finish()
    }
}

/// Wraps each logical call in the one-shot retry protocol
#[derive(Clone)]
pub struct RetryOrchestrator {
    executor: Arc<RequestExecutor>,
}

impl RetryOrchestrator {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    /// Perform one logical call. Holds at most one live connection at a time.
    pub fn call(&self, request: &ApiRequest) -> CallResponse {
        let mut first = self.executor.execute(request);

        if !first.outcome.is_auth_failure() {
            return CallResponse {
                outcome: CallOutcome::Completed { outcome: first.outcome },
                connection: first.take_connection(),
            };
        }

        debug!(route = %request.route, initial = ?first.outcome, "http.retry_begin");
        first.disconnect();

        let mut second = self.executor.execute(request);
        warn!(route = %request.route, status = ?second.status, "http.retry_completed");

        CallResponse {
            outcome: CallOutcome::Retried { initial: first.outcome, status: second.status },
            connection: second.take_connection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use hauth_domain::constants::{SLOT_PASSWORD, SLOT_SERVER_URL};
    use hauth_domain::{RequestOutcome, RetryState};

    use super::*;
    use crate::credentials::CredentialStore;
    use crate::storage::InMemoryKeyValueStore;
    use crate::testing::{FakeNetwork, ScriptedResponse, ScriptedTransport};

    fn orchestrator(password: &str, transport: &Arc<ScriptedTransport>) -> RetryOrchestrator {
        let storage = Arc::new(InMemoryKeyValueStore::with_slots([
            (SLOT_SERVER_URL, "https://auth.example.com"),
            (SLOT_PASSWORD, password),
        ]));
        let credentials = Arc::new(CredentialStore::load(storage, "DEVICE"));
        let executor = RequestExecutor::new(
            credentials,
            transport.clone(),
            Arc::new(FakeNetwork::default()),
        );
        RetryOrchestrator::new(Arc::new(executor))
    }

    fn auth_of(transport: &ScriptedTransport, index: usize) -> String {
        transport.sent()[index].header("Authorization").unwrap().to_string()
    }

    #[test]
    fn success_is_reported_without_retry() {
        let transport =
            Arc::new(ScriptedTransport::new().reply(ScriptedResponse::status(200).with_body("ok")));
        let mut response = orchestrator("pw", &transport).call(&ApiRequest::get("/status"));

        assert_eq!(
            response.outcome(),
            CallOutcome::Completed { outcome: RequestOutcome::Success(200) }
        );
        assert_eq!(response.read_body().unwrap(), "ok");
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn other_status_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new().reply(ScriptedResponse::status(403)));
        let response = orchestrator("pw", &transport).call(&ApiRequest::get("/status"));

        assert_eq!(response.outcome().state(), RetryState::Initial);
        assert_eq!(response.status(), Some(403));
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn transport_error_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new().fail("reset"));
        let response = orchestrator("pw", &transport).call(&ApiRequest::get("/status"));

        assert_eq!(
            response.outcome(),
            CallOutcome::Completed { outcome: RequestOutcome::TransportError }
        );
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn missing_credential_retries_once_and_reports_raw_status() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(ScriptedResponse::status(401))
                .reply(ScriptedResponse::status(401))
                .reply(ScriptedResponse::status(200)),
        );
        let response = orchestrator("", &transport).call(&ApiRequest::get("/status"));

        assert_eq!(
            response.outcome(),
            CallOutcome::Retried { initial: RequestOutcome::MissingCredential, status: Some(401) }
        );
        assert_eq!(response.outcome().legacy_code(), 401);
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn retry_uses_rotated_password() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(ScriptedResponse::status(401).with_header("X-Next-Password", "newpass"))
                .reply(ScriptedResponse::status(200)),
        );
        let response = orchestrator("stale", &transport).call(&ApiRequest::get("/status"));

        assert_eq!(
            response.outcome(),
            CallOutcome::Retried { initial: RequestOutcome::InvalidCredential, status: Some(200) }
        );
        assert!(response.is_success());
        assert_eq!(auth_of(&transport, 0), format!("Basic {}", STANDARD.encode("DEVICE:stale")));
        assert_eq!(auth_of(&transport, 1), format!("Basic {}", STANDARD.encode("DEVICE:newpass")));
    }

    #[test]
    fn first_connection_is_disconnected_before_retry() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(ScriptedResponse::status(401))
                .reply(ScriptedResponse::status(200)),
        );
        let response = orchestrator("pw", &transport).call(&ApiRequest::get("/status"));

        assert_eq!(transport.disconnects(), 1);
        assert_eq!(transport.live_connections(), 1);

        response.disconnect();
        assert_eq!(transport.disconnects(), 2);
        assert_eq!(transport.live_connections(), 0);
    }

    #[test]
    fn failed_retry_reports_no_status() {
        let transport = Arc::new(
            ScriptedTransport::new().reply(ScriptedResponse::status(401)).fail("reset"),
        );
        let mut response = orchestrator("pw", &transport).call(&ApiRequest::get("/status"));

        assert_eq!(
            response.outcome(),
            CallOutcome::Retried { initial: RequestOutcome::InvalidCredential, status: None }
        );
        assert!(response.read_body().is_err());
        assert_eq!(transport.live_connections(), 0);
    }

    #[test]
    fn post_body_is_resent_on_retry() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(ScriptedResponse::status(401))
                .reply(ScriptedResponse::status(200)),
        );
        let _ = orchestrator("pw", &transport).call(&ApiRequest::post("/events", r#"{"a":1}"#));

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|request| request.body.as_deref() == Some(r#"{"a":1}"#)));
    }
}
