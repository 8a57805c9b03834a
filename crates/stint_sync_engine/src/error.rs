//! Error types for the sync engine.

use stint_sync_protocol::ConflictSet;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a sync round.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// Another replica holds the server lock.
    #[error("sync lock unavailable: {0}")]
    LockContention(String),

    /// The server rejected the token or the requested permission.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// Malformed request or response body.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The merge found conflicts and no resolver is configured.
    #[error("merge found {} conflicts and no resolver is configured", conflicts.len())]
    Unresolved {
        /// The conflicts the round could not settle.
        conflicts: ConflictSet,
    },

    /// The configured resolver refused or failed.
    #[error("conflict resolver failed: {0}")]
    Resolver(String),

    /// Local store error during sync.
    #[error("store error: {0}")]
    Storage(#[from] stint_store::StoreError),

    /// Baseline snapshot could not be read or written.
    #[error("baseline error: {0}")]
    Baseline(String),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a baseline error.
    pub fn baseline(message: impl Into<String>) -> Self {
        Self::Baseline(message.into())
    }

    /// Returns true if retrying the whole round may succeed.
    ///
    /// Lock contention counts: the holder is expected to finish and
    /// unlock. Conflicts do not; they need a resolver, not a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::LockContention(_) => true,
            _ => false,
        }
    }

    /// Returns true if another replica held the server lock.
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, SyncError::LockContention(_))
    }

    /// Returns true if the round stopped on unsettled conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Unresolved { .. } | SyncError::Resolver(_))
    }
}
