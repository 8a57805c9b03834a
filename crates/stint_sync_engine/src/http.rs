//! HTTP transport implementation.
//!
//! This module provides an HTTP-based transport for the sync engine.
//! The actual HTTP client is abstracted via a trait so the transport
//! can be exercised without a network, and so other HTTP libraries can
//! be dropped in.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use std::time::Duration;
use stint_sync_protocol::{
    Changeset, Snapshot, API_TOKEN_HEADER, CHANGES_PATH, LOCK_PATH, SNAPSHOT_PATH, UNLOCK_PATH,
};

/// An HTTP response reduced to what the sync protocol needs.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. Errors
/// are I/O level only (connect, timeout); HTTP error statuses come
/// back as ordinary [`HttpResponse`] values for the transport to map.
pub trait HttpClient: Send + Sync {
    /// Sends a GET request.
    fn get(&self, url: &str, token: &str) -> Result<HttpResponse, String>;

    /// Sends a POST request with an optional JSON body.
    fn post(&self, url: &str, token: &str, body: Option<Vec<u8>>) -> Result<HttpResponse, String>;
}

/// HTTP-based sync transport speaking the stint server's JSON wire
/// format.
pub struct HttpTransport<C: HttpClient> {
    base_url: String,
    token: String,
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a new HTTP transport.
    pub fn new(client: C, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: token.into(),
            client,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(&self, operation: &str, path: &str, body: Option<Vec<u8>>) -> SyncResult<HttpResponse> {
        let response = self
            .client
            .post(&self.url(path), &self.token, body)
            .map_err(|message| SyncError::transport_retryable(format!("{operation}: {message}")))?;
        check_status(operation, response)
    }

    fn get(&self, operation: &str, path: &str) -> SyncResult<HttpResponse> {
        let response = self
            .client
            .get(&self.url(path), &self.token)
            .map_err(|message| SyncError::transport_retryable(format!("{operation}: {message}")))?;
        check_status(operation, response)
    }
}

impl<C: HttpClient> SyncTransport for HttpTransport<C> {
    fn lock(&self) -> SyncResult<()> {
        self.post("lock", LOCK_PATH, None).map(|_| ())
    }

    fn unlock(&self) -> SyncResult<()> {
        self.post("unlock", UNLOCK_PATH, None).map(|_| ())
    }

    fn fetch_snapshot(&self) -> SyncResult<Snapshot> {
        let response = self.get("fetch snapshot", SNAPSHOT_PATH)?;
        serde_json::from_slice(&response.body)
            .map_err(|err| SyncError::Protocol(format!("decode snapshot: {err}")))
    }

    fn push_changes(&self, changes: &Changeset) -> SyncResult<()> {
        let body = serde_json::to_vec(changes)
            .map_err(|err| SyncError::Protocol(format!("encode changes: {err}")))?;
        self.post("push changes", CHANGES_PATH, Some(body))
            .map(|_| ())
    }
}

/// Maps an HTTP error status onto the sync error taxonomy.
///
/// 409 is the server lock being held elsewhere, 4xx auth statuses are
/// token problems, and 5xx is worth retrying.
fn check_status(operation: &str, response: HttpResponse) -> SyncResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let text = String::from_utf8_lossy(&response.body).trim().to_string();
    Err(match response.status {
        409 => SyncError::LockContention(text),
        400 | 401 | 403 => SyncError::Unauthorized(format!("{operation}: {text}")),
        status if status >= 500 => {
            SyncError::transport_retryable(format!("{operation}: server returned {status}: {text}"))
        }
        status => {
            SyncError::transport_fatal(format!("{operation}: server returned {status}: {text}"))
        }
    })
}

/// HTTP client backed by a blocking reqwest client.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client with the given request timeout.
    pub fn new(timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SyncError::transport_fatal(format!("build http client: {err}")))?;
        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpResponse, String> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|err| err.to_string())?
            .to_vec();
        Ok(HttpResponse { status, body })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, token: &str) -> Result<HttpResponse, String> {
        let response = self
            .client
            .get(url)
            .header(API_TOKEN_HEADER, token)
            .send()
            .map_err(|err| err.to_string())?;
        Self::read(response)
    }

    fn post(&self, url: &str, token: &str, body: Option<Vec<u8>>) -> Result<HttpResponse, String> {
        let mut request = self.client.post(url).header(API_TOKEN_HEADER, token);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        let response = request.send().map_err(|err| err.to_string())?;
        Self::read(response)
    }
}

impl HttpTransport<ReqwestClient> {
    /// Builds a reqwest-backed transport from a sync configuration.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let client = ReqwestClient::new(config.timeout)?;
        Ok(Self::new(client, config.server_url.clone(), config.token.clone()))
    }
}
