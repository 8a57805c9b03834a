//! Three-way merge of two replicas against a shared baseline.

use std::cmp::Ordering;
use std::collections::HashMap;

use stint_model::Record;

use crate::{Change, Changeset, Conflict, ConflictSet, Snapshot};

/// Tuning for a single merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Treat a record that is missing from one replica but present in
    /// the baseline as deleted there: the unchanged copy on the other
    /// side gets a `Remove`, an edited copy raises a delete conflict.
    ///
    /// Unset, the merge is purely additive: one-sided records are kept
    /// (re-asserted to the remote when only the local replica has them)
    /// and deletions never propagate. Use the additive form when the
    /// baseline is synthesized rather than recorded, since a synthesized
    /// baseline cannot tell a deletion from a creation.
    pub propagate_removals: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            propagate_removals: true,
        }
    }
}

impl MergeOptions {
    /// Additive merge: no removals, no delete conflicts.
    pub fn additive() -> Self {
        MergeOptions {
            propagate_removals: false,
        }
    }
}

/// Merges `local` and `remote` against their shared baseline `original`.
///
/// Returns the corrections that bring the remote replica in line with
/// the local replica's uncontested edits, plus the conflicts neither
/// side wins outright. The caller applies the changeset to the remote,
/// replaces the local replica with the corrected remote state, and both
/// replicas agree.
pub fn merge(
    original: &Snapshot,
    local: &Snapshot,
    remote: &Snapshot,
    options: MergeOptions,
) -> (Changeset, ConflictSet) {
    let (sessions, session_conflicts) =
        merge_records(&original.sessions, &local.sessions, &remote.sessions, options);
    let (timeframes, timeframe_conflicts) = merge_records(
        &original.timeframes,
        &local.timeframes,
        &remote.timeframes,
        options,
    );
    let (tasks, task_conflicts) =
        merge_records(&original.tasks, &local.tasks, &remote.tasks, options);
    (
        Changeset {
            sessions,
            timeframes,
            tasks,
        },
        ConflictSet {
            sessions: session_conflicts,
            timeframes: timeframe_conflicts,
            tasks: task_conflicts,
        },
    )
}

/// Merges a single record kind.
///
/// Both replicas are walked in ascending ID order and the baseline is
/// consulted by lookup, so the output order is fixed by the record IDs
/// alone and equal inputs always produce equal outputs.
pub fn merge_records<T>(
    original: &[T],
    local: &[T],
    remote: &[T],
    options: MergeOptions,
) -> (Vec<Change<T>>, Vec<Conflict<T>>)
where
    T: Record + Clone + PartialEq,
{
    let baseline: HashMap<&str, &T> = original.iter().map(|r| (r.id(), r)).collect();
    let mut local: Vec<&T> = local.iter().collect();
    let mut remote: Vec<&T> = remote.iter().collect();
    local.sort_by(|a, b| a.id().cmp(b.id()));
    remote.sort_by(|a, b| a.id().cmp(b.id()));

    let mut changes = Vec::new();
    let mut conflicts = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < local.len() && j < remote.len() {
        match local[i].id().cmp(remote[j].id()) {
            Ordering::Equal => {
                merge_record(
                    baseline.get(local[i].id()).copied(),
                    local[i],
                    remote[j],
                    &mut changes,
                    &mut conflicts,
                );
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                local_only(&baseline, local[i], options, &mut changes, &mut conflicts);
                i += 1;
            }
            Ordering::Greater => {
                remote_only(&baseline, remote[j], options, &mut changes, &mut conflicts);
                j += 1;
            }
        }
    }
    for record in local[i..].iter().copied() {
        local_only(&baseline, record, options, &mut changes, &mut conflicts);
    }
    for record in remote[j..].iter().copied() {
        remote_only(&baseline, record, options, &mut changes, &mut conflicts);
    }
    (changes, conflicts)
}

/// The record exists on both replicas.
fn merge_record<T>(
    original: Option<&T>,
    local: &T,
    remote: &T,
    changes: &mut Vec<Change<T>>,
    conflicts: &mut Vec<Conflict<T>>,
) where
    T: Clone + PartialEq,
{
    if local == remote {
        return;
    }
    if original == Some(local) {
        // only remote changed, nothing to correct
        return;
    }
    if original == Some(remote) {
        changes.push(Change::exist(local.clone()));
        return;
    }
    conflicts.push(Conflict::new(
        original.cloned(),
        Some(local.clone()),
        Some(remote.clone()),
    ));
}

/// The record exists only on the local replica.
fn local_only<T>(
    baseline: &HashMap<&str, &T>,
    local: &T,
    options: MergeOptions,
    changes: &mut Vec<Change<T>>,
    conflicts: &mut Vec<Conflict<T>>,
) where
    T: Record + Clone + PartialEq,
{
    let original = match baseline.get(local.id()) {
        Some(original) if options.propagate_removals => *original,
        _ => {
            // local creation, or additive mode: re-assert it remotely
            changes.push(Change::exist(local.clone()));
            return;
        }
    };
    if original == local {
        // remote deleted it, local never touched it; adopting the
        // corrected remote state deletes it here too
        return;
    }
    conflicts.push(Conflict::new(
        Some(original.clone()),
        Some(local.clone()),
        None,
    ));
}

/// The record exists only on the remote replica.
fn remote_only<T>(
    baseline: &HashMap<&str, &T>,
    remote: &T,
    options: MergeOptions,
    changes: &mut Vec<Change<T>>,
    conflicts: &mut Vec<Conflict<T>>,
) where
    T: Record + Clone + PartialEq,
{
    if !options.propagate_removals {
        return;
    }
    let original = match baseline.get(remote.id()) {
        Some(original) => *original,
        // remote creation, picked up when the corrected state is adopted
        None => return,
    };
    if original == remote {
        changes.push(Change::remove(remote.clone()));
        return;
    }
    conflicts.push(Conflict::new(
        Some(original.clone()),
        None,
        Some(remote.clone()),
    ));
}
