//! The three record types.
//!
//! Serde renames follow the sync wire format, which uses Go-style
//! `PascalCase` keys with `ID` fully capitalized.

use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (possibly non-contiguous) session of some activity.
///
/// Example: one gaming session, playing Mario Kart. A session owns zero or
/// more [`Timeframe`]s via their `session_id` back-reference, and may point
/// at a [`Task`] it contributes to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    /// Stable identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Short human-readable description.
    pub description: String,
    /// Free-form notes.
    pub notes: String,
    /// Task this session contributes to, if any. Relation and lookup only;
    /// the task does not own the session.
    #[serde(rename = "TaskID")]
    pub task_id: Option<String>,
}

/// A contiguous span of time within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Timeframe {
    /// Stable identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Owning session.
    #[serde(rename = "SessionID")]
    pub session_id: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant. Expected to be at or after `start`, but not enforced
    /// at this layer.
    pub end: DateTime<Utc>,
    /// Whether this span is finished (no longer being extended).
    pub done: bool,
}

impl Timeframe {
    /// Returns the span's length.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// A task sessions can be tracked against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    /// Stable identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Short human-readable description.
    pub description: String,
}

impl Record for Session {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Timeframe {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }
}
