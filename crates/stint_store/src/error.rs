//! Store error types.

use stint_model::RecordKind;
use thiserror::Error;

/// Errors from opening or operating on the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite failed.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database file was written by a newer build.
    #[error("schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion {
        /// Version recorded in the file.
        found: u32,
        /// Latest version this build knows.
        supported: u32,
    },

    /// The addressed record does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// The record's kind.
        kind: RecordKind,
        /// The record's ID.
        id: String,
    },

    /// The session exists but has no timeframes to operate on.
    #[error("session {0} has no timeframes")]
    NoTimeframes(String),

    /// A persisted value could not be interpreted.
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Not-found error for one record.
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True when the error is a missing record rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
