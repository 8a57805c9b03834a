//! # Stint Sync Server
//!
//! HTTP sync server for stint.
//!
//! This crate provides:
//! - `SyncServer`, the transport-free core over the shared store
//! - An advisory lock serializing whole sync rounds
//! - Hashed API token authentication with per-token permissions
//! - The axum HTTP front speaking the stint JSON wire format
//!
//! ## Architecture
//!
//! The server uses the **same sqlite store** as clients; there is no
//! separate server database. Clients lock, exchange snapshots and
//! changesets, and unlock. The lock is advisory and in-process, so a
//! restart clears it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod error;
mod http;
mod lock;
mod server;

pub use auth::{Token, TokenHash, TokenInfo, TokenRegistry, SYNC_PERMISSION};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use http::{router, serve, serve_on};
pub use lock::{AdvisoryLock, LocalLock};
pub use server::SyncServer;
