//! # Stint Model
//!
//! Entity types for stint time tracking.
//!
//! This crate provides:
//! - `Session`, `Timeframe`, and `Task` record types
//! - The `Record` trait exposing each record's stable identifier
//! - JSON field names matching the sync wire format
//!
//! Records are plain values: identity is the `ID` string, equality is
//! field-by-field value equality, and timestamps compare as UTC instants.
//! The storage layer's rowid never appears here.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entities;
mod record;

pub use entities::{Session, Task, Timeframe};
pub use record::{Record, RecordKind};
