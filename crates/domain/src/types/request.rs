//! Request descriptions handed to the executor

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::HauthError;

/// Ordered query parameters; insertion order is kept on the wire.
pub type QueryParams = serde_json::Map<String, Value>;

/// HTTP methods the executor knows how to send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }

    /// Every method except GET carries the request body.
    pub fn sends_body(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = HauthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            other => Err(HauthError::InvalidInput(format!("Unsupported HTTP method: {other}"))),
        }
    }
}

/// One logical call: route relative to the stored server, query, method and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    pub route: String,
    pub query: QueryParams,
    pub method: HttpMethod,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, route: impl Into<String>) -> Self {
        Self { route: route.into(), query: QueryParams::new(), method, body: None }
    }

    pub fn get(route: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, route)
    }

    pub fn post(route: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, route).with_body(body)
    }

    /// Add a query parameter. A repeated key replaces the earlier value.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_query_params(mut self, params: QueryParams) -> Self {
        self.query.extend(params);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}
