//! # Stint Sync Engine
//!
//! Client-side sync rounds for stint.
//!
//! This crate provides:
//! - `SyncClient` running whole sync rounds (lock, fetch, merge,
//!   commit, unlock)
//! - Baseline snapshot persistence between rounds
//! - Conflict resolvers and the `ResolvePolicy` shorthand
//! - HTTP transport speaking the stint server's JSON wire format
//! - `SnapshotStore` seam over the local replica
//!
//! ## Architecture
//!
//! A round is a **full-state exchange**: both replicas' complete
//! snapshots are compared against the baseline they last agreed on,
//! and the differences become a small changeset. The server applies
//! the changeset; the client replaces its replica with the corrected
//! server snapshot. The snapshot exported afterwards is stored as the
//! next round's baseline.
//!
//! ## Key Invariants
//!
//! - The server lock is held for the whole round
//! - A round with unresolved conflicts writes nothing on either side
//! - Without a usable baseline the merge is additive; nothing is
//!   deleted on a first sync
//! - Transport errors are reported, never retried inside a round

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod baseline;
mod client;
mod config;
mod error;
mod http;
mod resolver;
mod store;
mod transport;

pub use baseline::{load_baseline, store_baseline};
pub use client::{SyncClient, SyncOutcome};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpResponse, HttpTransport, ReqwestClient};
pub use resolver::{ConflictResolver, FnResolver, LocalWins, RemoteWins, ResolvePolicy};
pub use store::{MemoryStore, SnapshotStore};
pub use transport::{MockTransport, SyncTransport};
