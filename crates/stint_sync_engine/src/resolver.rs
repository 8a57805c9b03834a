//! Conflict resolution.
//!
//! When the merge cannot decide a record, the round hands the whole
//! [`ConflictSet`] to a resolver. The resolver answers with a
//! supplementary changeset that is appended to the corrections before
//! anything is committed, so a refusal aborts the round with no writes
//! on either side.

use crate::error::{SyncError, SyncResult};
use stint_sync_protocol::{Change, Changeset, Conflict, ConflictSet};

/// Settles conflicts the merge could not decide.
pub trait ConflictResolver: Send + Sync {
    /// Produces the supplementary changeset for `conflicts`, or errors
    /// to abort the round.
    fn resolve(&self, conflicts: &ConflictSet) -> SyncResult<Changeset>;
}

/// How a sync round settles conflicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolvePolicy {
    /// Abort the round and report the conflicts.
    #[default]
    Fail,
    /// Keep this replica's side of every conflict.
    Local,
    /// Keep the server's side of every conflict.
    Remote,
}

impl ResolvePolicy {
    /// Returns the resolver implementing this policy, or `None` for
    /// [`ResolvePolicy::Fail`].
    pub fn into_resolver(self) -> Option<Box<dyn ConflictResolver>> {
        match self {
            ResolvePolicy::Fail => None,
            ResolvePolicy::Local => Some(Box::new(LocalWins)),
            ResolvePolicy::Remote => Some(Box::new(RemoteWins)),
        }
    }
}

/// Resolver that keeps the local side of every conflict.
///
/// A surviving local value is re-asserted as a correction. A local
/// deletion wins by deleting the record the remote still has.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWins;

impl ConflictResolver for LocalWins {
    fn resolve(&self, conflicts: &ConflictSet) -> SyncResult<Changeset> {
        let mut changes = Changeset::default();
        changes
            .sessions
            .extend(conflicts.sessions.iter().filter_map(keep_local));
        changes
            .timeframes
            .extend(conflicts.timeframes.iter().filter_map(keep_local));
        changes
            .tasks
            .extend(conflicts.tasks.iter().filter_map(keep_local));
        Ok(changes)
    }
}

fn keep_local<T: Clone>(conflict: &Conflict<T>) -> Option<Change<T>> {
    match (&conflict.local, &conflict.remote) {
        (Some(local), _) => Some(Change::exist(local.clone())),
        (None, Some(remote)) => Some(Change::remove(remote.clone())),
        (None, None) => None,
    }
}

/// Resolver that keeps the server's side of every conflict.
///
/// The adopted server snapshot already carries every remote value, so
/// no corrections are needed on either side.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteWins;

impl ConflictResolver for RemoteWins {
    fn resolve(&self, _conflicts: &ConflictSet) -> SyncResult<Changeset> {
        Ok(Changeset::default())
    }
}

/// Resolver wrapping a plain function.
///
/// Lets callers settle conflicts with a closure instead of a named
/// type.
pub struct FnResolver<F>(F);

impl<F> FnResolver<F>
where
    F: Fn(&ConflictSet) -> SyncResult<Changeset> + Send + Sync,
{
    /// Wraps `f` as a resolver.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ConflictResolver for FnResolver<F>
where
    F: Fn(&ConflictSet) -> SyncResult<Changeset> + Send + Sync,
{
    fn resolve(&self, conflicts: &ConflictSet) -> SyncResult<Changeset> {
        (self.0)(conflicts)
    }
}
