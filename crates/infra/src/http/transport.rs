//! Blocking [`Transport`] implementation.
//!
//! `reqwest` fixes the connect timeout per client, so one client is built and
//! cached for each distinct timeout a request asks for. Only the connect phase
//! is bounded; a slow response is waited out. System proxies are ignored.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use hauth_core::{Connection, PreparedRequest, Transport};
use hauth_domain::{HauthError, HttpMethod, Result};
use parking_lot::Mutex;
use reqwest::blocking::{Client, Response};
use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::debug;

use crate::errors::InfraError;

/// Blocking HTTP transport
pub struct ReqwestTransport {
    clients: Mutex<HashMap<Duration, Client>>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { clients: Mutex::new(HashMap::new()) }
    }

    fn client_for(&self, connect_timeout: Duration) -> Result<Client> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&connect_timeout) {
            return Ok(client.clone());
        }

        // The blocking builder defaults to a 30s total timeout; clear it.
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(None)
            .no_proxy()
            .build()
            .map_err(InfraError::from)?;
        clients.insert(connect_timeout, client.clone());
        Ok(client)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &PreparedRequest) -> Result<Box<dyn Connection>> {
        let client = self.client_for(request.connect_timeout)?;

        let mut builder = client.request(to_method(request.method), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "http.sending");
        let response = builder.send().map_err(InfraError::from)?;
        debug!(status = response.status().as_u16(), url = %request.url, "http.received");

        Ok(Box::new(ReqwestConnection::new(response)))
    }
}

/// An open response. Status, headers and declared length stay available
/// after the body has been read.
pub struct ReqwestConnection {
    status: u16,
    headers: HeaderMap,
    content_length: Option<u64>,
    response: Option<Response>,
}

impl ReqwestConnection {
    fn new(response: Response) -> Self {
        Self {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
            content_length: response.content_length(),
            response: Some(response),
        }
    }
}

impl Connection for ReqwestConnection {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Read the body line by line, concatenating lines without separators.
    fn read_body(&mut self) -> Result<String> {
        let response = self
            .response
            .take()
            .ok_or_else(|| HauthError::Transport("body already consumed".into()))?;

        let mut body = String::new();
        for line in BufReader::new(response).lines() {
            let line = line.map_err(|err| HauthError::Transport(format!("body read failed: {err}")))?;
            body.push_str(&line);
        }
        Ok(body)
    }

    fn disconnect(self: Box<Self>) {
        debug!(status = self.status, "http.disconnected");
    }
}
