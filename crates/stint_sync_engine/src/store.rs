//! Local replica abstraction for sync rounds.
//!
//! The engine only needs two things from a replica: export everything,
//! and replace everything with a corrected server snapshot. The sqlite
//! store implements this; [`MemoryStore`] keeps a snapshot in memory
//! for tests and tooling.

use crate::error::SyncResult;
use parking_lot::Mutex;
use stint_model::Record;
use stint_sync_protocol::{Change, ChangeOp, Changeset, Snapshot};

/// The local replica as seen by the sync engine.
pub trait SnapshotStore: Send + Sync {
    /// Exports the replica's full contents.
    fn export_snapshot(&self) -> SyncResult<Snapshot>;

    /// Replaces the replica with `snapshot` corrected by `changes`.
    fn replace_with(&self, snapshot: &Snapshot, changes: &Changeset) -> SyncResult<()>;
}

impl SnapshotStore for stint_store::Database {
    fn export_snapshot(&self) -> SyncResult<Snapshot> {
        Ok(self.export()?)
    }

    fn replace_with(&self, snapshot: &Snapshot, changes: &Changeset) -> SyncResult<()> {
        Ok(self.replace_and_import(snapshot, changes)?)
    }
}

/// An in-memory replica.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Snapshot>,
}

impl MemoryStore {
    /// Creates a store holding `snapshot`.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            contents: Mutex::new(snapshot),
        }
    }

    /// Returns a copy of the store's contents.
    pub fn contents(&self) -> Snapshot {
        self.contents.lock().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn export_snapshot(&self) -> SyncResult<Snapshot> {
        Ok(self.contents())
    }

    fn replace_with(&self, snapshot: &Snapshot, changes: &Changeset) -> SyncResult<()> {
        let mut next = snapshot.clone();
        apply_kind(&mut next.sessions, &changes.sessions);
        apply_kind(&mut next.timeframes, &changes.timeframes);
        apply_kind(&mut next.tasks, &changes.tasks);
        *self.contents.lock() = next;
        Ok(())
    }
}

fn apply_kind<T: Record + Clone>(records: &mut Vec<T>, changes: &[Change<T>]) {
    for change in changes {
        match change.operation {
            ChangeOp::Exist => {
                match records.iter_mut().find(|r| r.id() == change.data.id()) {
                    Some(slot) => *slot = change.data.clone(),
                    None => records.push(change.data.clone()),
                }
            }
            ChangeOp::Remove => records.retain(|r| r.id() != change.data.id()),
        }
    }
}
