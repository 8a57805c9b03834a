//! CLI command implementations.

pub mod export;
pub mod frame;
pub mod gen_token;
pub mod serve;
pub mod session;
pub mod sync;
pub mod task;

use chrono::{DateTime, Utc};

/// Parses an RFC 3339 timestamp argument into a UTC instant.
fn parse_instant(value: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|err| format!("invalid timestamp {value:?}: {err}"))?
        .with_timezone(&Utc))
}
