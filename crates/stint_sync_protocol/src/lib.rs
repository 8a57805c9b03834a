//! # Stint Sync Protocol
//!
//! Snapshot, changeset, and three-way merge types for stint sync.
//!
//! This crate provides:
//! - `Snapshot` for full-database exchange between replicas
//! - `Change` / `Changeset` for minimal corrections to a replica
//! - `Conflict` / `ConflictSet` for divergent edits the merge cannot decide
//! - `merge` for three-way reconciliation of two replicas against a
//!   common baseline
//!
//! This is a pure protocol crate with no I/O operations. The wire shape
//! of every type is plain JSON with `PascalCase` keys, so snapshots and
//! changesets interoperate with existing stint servers.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change;
mod conflict;
mod merge;
mod snapshot;
mod wire;

pub use change::{Change, ChangeOp, Changeset, ProtocolError};
pub use conflict::{Conflict, ConflictSet};
pub use merge::{merge, merge_records, MergeOptions};
pub use snapshot::Snapshot;
pub use wire::{API_TOKEN_HEADER, CHANGES_PATH, LOCK_PATH, SNAPSHOT_PATH, UNLOCK_PATH};
