//! Conflicts the merge cannot decide on its own.

use serde::{Deserialize, Serialize};
use stint_model::{Session, Task, Timeframe};

use crate::wire::nullable_vec;

/// One record on which the two replicas made incompatible edits.
///
/// A `None` side means the record is absent there: `original: None` is a
/// concurrent creation on both replicas, `local: None` or `remote: None`
/// is a deletion racing an edit. `local` and `remote` are never both
/// `None` for a conflict the merge emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Conflict<T> {
    /// The record as the shared baseline knew it.
    pub original: Option<T>,
    /// The record as the local replica has it now.
    pub local: Option<T>,
    /// The record as the remote replica has it now.
    pub remote: Option<T>,
}

impl<T> Conflict<T> {
    /// Builds a conflict from its three sides.
    pub fn new(original: Option<T>, local: Option<T>, remote: Option<T>) -> Self {
        Conflict {
            original,
            local,
            remote,
        }
    }

    /// Both replicas still hold the record, with divergent field values.
    pub fn is_edit_conflict(&self) -> bool {
        self.local.is_some() && self.remote.is_some()
    }

    /// One replica deleted the record while the other edited it.
    pub fn is_delete_conflict(&self) -> bool {
        self.local.is_none() != self.remote.is_none()
    }

    /// The record was created independently on both replicas.
    pub fn is_create_conflict(&self) -> bool {
        self.original.is_none()
    }
}

/// Conflicts for every record kind found in one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConflictSet {
    /// Conflicting sessions.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub sessions: Vec<Conflict<Session>>,
    /// Conflicting timeframes.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub timeframes: Vec<Conflict<Timeframe>>,
    /// Conflicting tasks.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tasks: Vec<Conflict<Task>>,
}

impl ConflictSet {
    /// Returns true when the merge found no conflicts.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.timeframes.is_empty() && self.tasks.is_empty()
    }

    /// Total number of conflicts across all kinds.
    pub fn len(&self) -> usize {
        self.sessions.len() + self.timeframes.len() + self.tasks.len()
    }
}
