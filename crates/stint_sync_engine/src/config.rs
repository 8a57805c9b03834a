//! Configuration for the sync engine.

use crate::resolver::ResolvePolicy;
use std::time::Duration;

/// Configuration for sync rounds.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the sync server (e.g. "https://stint.example.com").
    pub server_url: String,
    /// API token presented on every request.
    pub token: String,
    /// Request timeout.
    pub timeout: Duration,
    /// How to settle conflicts the merge cannot decide.
    pub resolve: ResolvePolicy,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(server_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: token.into(),
            timeout: Duration::from_secs(30),
            resolve: ResolvePolicy::Fail,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the conflict policy.
    pub fn with_resolve(mut self, resolve: ResolvePolicy) -> Self {
        self.resolve = resolve;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}
