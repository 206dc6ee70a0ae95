//! HTTP transport layer
//!
//! The core of the harness never talks to the network directly: it drives a
//! [`Transport`], which turns "send one GET" into an observed status code and
//! byte count. [`HttpTransport`] is the production implementation; tests
//! substitute scripted mocks.
//!
//! Transport-level failures (connection refused, DNS, timeout) are not
//! errors from the harness's point of view - they are outcomes to be
//! recorded. They map to the `"000"` sentinel status with zero bytes, the
//! same convention the status line of a failed curl transfer reports.

use crate::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

/// Status recorded when no HTTP response was received at all
pub const NO_RESPONSE_STATUS: &str = "000";

/// Status that triggers retry with backoff instead of immediate failure
pub const RATE_LIMIT_STATUS: &str = "429";

/// Status counted as a successful retrieval
pub const SUCCESS_STATUS: &str = "200";

/// Observed outcome of a single send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// HTTP status code as reported by the server, or [`NO_RESPONSE_STATUS`]
    pub status: String,
    /// Payload bytes downloaded (0 on failure)
    pub bytes: u64,
}

impl SendOutcome {
    pub fn new(status: impl Into<String>, bytes: u64) -> Self {
        Self {
            status: status.into(),
            bytes,
        }
    }

    /// Outcome for a transport failure or timeout: no status line, no bytes.
    pub fn no_response() -> Self {
        Self {
            status: NO_RESPONSE_STATUS.to_string(),
            bytes: 0,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == RATE_LIMIT_STATUS
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// Opaque request capability supplied to the core
///
/// Implementations own auth-header construction and the actual wire
/// protocol; the harness only sees the outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one GET with the given timeout and report what came back.
    ///
    /// Must not fail: failures without a response map to
    /// [`SendOutcome::no_response`].
    async fn send(&self, uri: &str, timeout: Duration) -> SendOutcome;
}

/// Production transport backed by a shared reqwest client
///
/// An optional bearer token is injected on every request. The token is
/// supplied by the caller (flag or environment); the harness never acquires
/// credentials itself.
pub struct HttpTransport {
    client: reqwest::Client,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(bearer_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            bearer_token,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, uri: &str, timeout: Duration) -> SendOutcome {
        let mut request = self.client.get(uri).timeout(timeout);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(uri, error = %err, "no response received");
                return SendOutcome::no_response();
            }
        };

        let status = response.status().as_u16().to_string();
        // Drain the body so the byte count reflects the full retrieval, not
        // just the headers. A mid-body failure counts the bytes as lost.
        let bytes = match response.bytes().await {
            Ok(body) => body.len() as u64,
            Err(err) => {
                tracing::debug!(uri, error = %err, "response body read failed");
                0
            }
        };

        SendOutcome { status, bytes }
    }
}
