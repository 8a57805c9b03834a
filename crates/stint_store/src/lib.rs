//! # Stint Store
//!
//! SQLite persistence for stint records.
//!
//! This crate provides:
//! - `Database` for session, timeframe, and task CRUD
//! - snapshot export and replace-and-import for sync rounds
//! - `StoreEvent` notifications after committed mutations
//!
//! Timestamps are stored as fixed-width RFC 3339 text and parsed back
//! to UTC instants, so values survive round trips without losing
//! precision and record equality means the same instant on every
//! replica.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod database;
mod error;
mod events;
mod migrations;

pub use database::{Database, NewSession, NewTimeframe};
pub use error::StoreError;
pub use events::StoreEvent;
pub use migrations::latest_version;
