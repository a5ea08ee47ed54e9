//! Test doubles for the core ports
//!
//! Scripted, in-process implementations used by this crate's tests and by
//! downstream crates that exercise core services without real I/O.

#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use hauth_domain::{HauthError, Result};
use parking_lot::Mutex;

use crate::http::{Connection, NetworkMonitor, PreparedRequest, Transport};
use crate::identity::{DeviceInfoProvider, IdentityProbe};

/// Network monitor with a switchable state
#[derive(Debug)]
pub struct FakeNetwork {
    connected: AtomicBool,
}

impl FakeNetwork {
    pub fn new(connected: bool) -> Self {
        Self { connected: AtomicBool::new(connected) }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl Default for FakeNetwork {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkMonitor for FakeNetwork {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// One scripted reply from [`ScriptedTransport`]
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ScriptedResponse {
    pub fn status(status: u16) -> Self {
        Self { status, ..Self::default() }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

#[derive(Default)]
struct TransportLog {
    replies: VecDeque<Result<ScriptedResponse>>,
    sent: Vec<PreparedRequest>,
}

/// Transport that replays scripted replies in order and records every request.
///
/// Tracks live connections so tests can assert nothing leaks.
#[derive(Default)]
pub struct ScriptedTransport {
    log: Mutex<TransportLog>,
    live: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, response: ScriptedResponse) -> Self {
        self.log.lock().replies.push_back(Ok(response));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.log.lock().replies.push_back(Err(HauthError::Transport(message.to_string())));
        self
    }

    /// Requests sent so far, oldest first.
    pub fn sent(&self) -> Vec<PreparedRequest> {
        self.log.lock().sent.clone()
    }

    /// Connections handed out and not yet dropped or disconnected.
    pub fn live_connections(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Explicit `disconnect` calls observed.
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &PreparedRequest) -> Result<Box<dyn Connection>> {
        let reply = {
            let mut log = self.log.lock();
            log.sent.push(request.clone());
            log.replies
                .pop_front()
                .unwrap_or_else(|| Err(HauthError::Transport("no scripted reply left".into())))
        };

        let response = reply?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedConnection {
            response,
            body_read: false,
            live: self.live.clone(),
            disconnects: self.disconnects.clone(),
        }))
    }
}

struct ScriptedConnection {
    response: ScriptedResponse,
    body_read: bool,
    live: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
}

impl Connection for ScriptedConnection {
    fn status(&self) -> u16 {
        self.response.status
    }

    fn header(&self, name: &str) -> Option<String> {
        self.response.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn content_length(&self) -> Option<u64> {
        u64::try_from(self.response.body.len()).ok()
    }

    fn read_body(&mut self) -> Result<String> {
        if self.body_read {
            return Err(HauthError::Transport("body already consumed".into()));
        }
        self.body_read = true;
        Ok(self.response.body.lines().collect())
    }

    fn disconnect(self: Box<Self>) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Device metadata with fixed answers
#[derive(Debug, Clone, Default)]
pub struct FakeDevice {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub secure_id: Option<String>,
}

impl FakeDevice {
    /// A device on the built-in probe's known manufacturer/model list.
    pub fn known_model() -> Self {
        Self {
            manufacturer: Some("Freescale".into()),
            model: Some("PM098-MX6DQ".into()),
            ..Self::default()
        }
    }
}

impl DeviceInfoProvider for FakeDevice {
    fn manufacturer(&self) -> Option<String> {
        self.manufacturer.clone()
    }

    fn model(&self) -> Option<String> {
        self.model.clone()
    }

    fn os_serial(&self) -> Option<String> {
        self.serial.clone()
    }

    fn secure_id(&self) -> Option<String> {
        self.secure_id.clone()
    }
}

/// Probe that replays scripted outputs and counts invocations
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    outputs: Mutex<VecDeque<Option<String>>>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(outputs: &[Option<&str>]) -> Self {
        Self {
            outputs: Mutex::new(outputs.iter().map(|o| o.map(str::to_string)).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdentityProbe for ScriptedProbe {
    fn probe(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outputs.lock().pop_front().flatten()
    }
}
