//! The sync round orchestrator.
//!
//! A round runs the whole exchange against a locked server: fetch both
//! snapshots, three-way merge against the baseline, settle conflicts,
//! then push the corrections while the local replica adopts the
//! corrected server state. The snapshot exported afterwards is the
//! next round's baseline.

use crate::error::{SyncError, SyncResult};
use crate::resolver::{ConflictResolver, ResolvePolicy};
use crate::store::SnapshotStore;
use crate::transport::SyncTransport;
use parking_lot::RwLock;
use std::thread;
use stint_sync_protocol::{merge, Changeset, MergeOptions, Snapshot};
use tracing::{debug, info, warn};

/// Outcome of a completed sync round.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Corrections pushed to the server.
    pub pushed: Changeset,
    /// The state both replicas now agree on. The caller persists this
    /// as the next round's baseline.
    pub baseline: Snapshot,
    /// True when the round ran without a usable baseline and merged
    /// additively.
    pub first_sync: bool,
    /// Number of conflicts the resolver settled.
    pub resolved: usize,
}

/// A sync client run by one replica against one server.
pub struct SyncClient<T: SyncTransport, S: SnapshotStore> {
    transport: T,
    store: S,
    resolver: RwLock<Option<Box<dyn ConflictResolver>>>,
}

impl<T: SyncTransport, S: SnapshotStore> SyncClient<T, S> {
    /// Creates a client with no resolver; rounds that hit conflicts
    /// fail with [`SyncError::Unresolved`].
    pub fn new(transport: T, store: S) -> Self {
        Self {
            transport,
            store,
            resolver: RwLock::new(None),
        }
    }

    /// Sets the conflict resolver.
    pub fn with_resolver(self, resolver: Box<dyn ConflictResolver>) -> Self {
        *self.resolver.write() = Some(resolver);
        self
    }

    /// Sets the resolver from a policy.
    pub fn with_policy(self, policy: ResolvePolicy) -> Self {
        self.set_policy(policy);
        self
    }

    /// Replaces the resolver with the one `policy` names.
    pub fn set_policy(&self, policy: ResolvePolicy) {
        *self.resolver.write() = policy.into_resolver();
    }

    /// Returns the local store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs one sync round.
    ///
    /// `baseline` is the snapshot returned by the previous round, or
    /// `None` on a first sync. The server lock is held for the whole
    /// round and released on every path after it is acquired; a failed
    /// release is logged rather than masking the round's own result.
    pub fn sync(&self, baseline: Option<Snapshot>) -> SyncResult<SyncOutcome> {
        self.transport.lock()?;
        debug!("acquired server lock");
        let result = self.locked_round(baseline);
        if let Err(err) = self.transport.unlock() {
            warn!(error = %err, "failed to release server lock");
        }
        result
    }

    fn locked_round(&self, baseline: Option<Snapshot>) -> SyncResult<SyncOutcome> {
        let (remote, local) = thread::scope(|scope| {
            let remote = scope.spawn(|| self.transport.fetch_snapshot());
            let local = self.store.export_snapshot();
            (join(remote), local)
        });
        let remote = remote?;
        let local = local?;

        let (original, options, first_sync) = match baseline {
            Some(snapshot) if baseline_usable(&snapshot) => {
                (snapshot, MergeOptions::default(), false)
            }
            _ => {
                info!("no usable baseline; merging additively against the server snapshot");
                (remote.clone(), MergeOptions::additive(), true)
            }
        };

        let (mut changes, conflicts) = merge(&original, &local, &remote, options);
        let resolved = conflicts.len();
        if !conflicts.is_empty() {
            let supplement = {
                let resolver = self.resolver.read();
                match resolver.as_ref() {
                    None => return Err(SyncError::Unresolved { conflicts }),
                    Some(resolver) => {
                        debug!(count = conflicts.len(), "handing conflicts to the resolver");
                        resolver.resolve(&conflicts)?
                    }
                }
            };
            changes.append(supplement);
        }

        debug!(corrections = changes.len(), "committing sync round");
        let (pushed, replaced) = thread::scope(|scope| {
            let pushed = scope.spawn(|| self.transport.push_changes(&changes));
            let replaced = self.store.replace_with(&remote, &changes);
            (join(pushed), replaced)
        });
        pushed?;
        replaced?;

        let baseline = self.store.export_snapshot()?;
        info!(
            pushed = changes.len(),
            resolved, first_sync, "sync round complete"
        );
        Ok(SyncOutcome {
            pushed: changes,
            baseline,
            first_sync,
            resolved,
        })
    }
}

/// A baseline with neither sessions nor timeframes is treated as
/// absent. Tasks alone do not count; baseline files written before
/// tasks existed carry none.
fn baseline_usable(snapshot: &Snapshot) -> bool {
    !(snapshot.sessions.is_empty() && snapshot.timeframes.is_empty())
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
