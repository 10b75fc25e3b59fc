//! Shared HTTP client wrapper
//!
//! Thin wrapper around `reqwest::blocking::Client` that centralizes
//! USER_AGENT, timeouts and default headers.

use crate::config::network::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, USER_AGENT};
use crate::error::{AppError, Result};
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP client with standard configuration
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::with_headers(HeaderMap::new())
    }

    /// Create a client that sends `headers` with every request
    pub fn with_headers(headers: HeaderMap) -> Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()?;
        Ok(Self { inner })
    }

    /// Start a request
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "remote request");
        self.inner.request(method, url)
    }

    /// Send a request, turning non-2xx responses into [`AppError::Remote`]
    pub fn send(&self, request: RequestBuilder) -> Result<Response> {
        let resp = request.send()?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().unwrap_or_default();
        Err(AppError::Remote {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    /// Access the underlying reqwest client
    pub fn inner(&self) -> &reqwest::blocking::Client {
        &self.inner
    }
}

/// Pull a readable message out of an error response body
///
/// Backends answer with `{"message": "...", "details": ...}`; anything
/// else is returned as-is.
pub fn error_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "empty response".to_string();
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
