//! Error types for the sync server.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The advisory lock is held by another client.
    #[error("database is locked by {holder}")]
    Locked {
        /// Name of the client holding the lock.
        holder: String,
    },

    /// Unlock attempted by a client that does not hold the lock.
    #[error("lock is not held by {identity}")]
    NotHolder {
        /// Name of the client that asked.
        identity: String,
    },

    /// Token absent or not shaped like a token.
    #[error("malformed api token")]
    MalformedToken,

    /// Token not present in the registry.
    #[error("unknown api token")]
    UnknownToken,

    /// Token valid but missing the required permission.
    #[error("insufficient permissions: {0} required")]
    PermissionDenied(String),

    /// Tokens file could not be read or parsed.
    #[error("tokens file {path}: {message}")]
    TokenFile {
        /// Path of the tokens file.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// Malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Store error.
    #[error("store error: {0}")]
    Storage(#[from] stint_store::StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::Locked { .. }
                | ServerError::NotHolder { .. }
                | ServerError::MalformedToken
                | ServerError::UnknownToken
                | ServerError::PermissionDenied(_)
                | ServerError::InvalidRequest(_)
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}
