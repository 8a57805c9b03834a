//! Full-database snapshots.

use serde::{Deserialize, Serialize};
use stint_model::{Session, Task, Timeframe};

use crate::wire::nullable_vec;

/// Every record in a replica at one point in time.
///
/// Snapshots are what replicas exchange during sync: the server serves
/// one, the merge takes three, and the baseline file on disk holds one.
/// Ordering within each array carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    /// All sessions.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub sessions: Vec<Session>,
    /// All timeframes.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub timeframes: Vec<Timeframe>,
    /// All tasks.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tasks: Vec<Task>,
}

impl Snapshot {
    /// Returns true when the snapshot holds no records of any kind.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.timeframes.is_empty() && self.tasks.is_empty()
    }

    /// Total number of records across all kinds.
    pub fn record_count(&self) -> usize {
        self.sessions.len() + self.timeframes.len() + self.tasks.len()
    }
}
