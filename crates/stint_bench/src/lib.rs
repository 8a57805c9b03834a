//! Shared benchmark fixtures.

use chrono::{DateTime, Duration, TimeZone, Utc};
use stint_model::{Session, Timeframe};
use stint_store::{NewSession, NewTimeframe};
use stint_sync_protocol::Snapshot;

/// A fixed instant all generated timeframes count from.
pub fn base_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

/// Builds a replica snapshot with `count` sessions, each owning one
/// finished timeframe. IDs are deterministic so clones of the same
/// snapshot diverge only where a benchmark edits them.
pub fn replica(count: usize) -> Snapshot {
    let base = base_instant();
    let sessions = (0..count)
        .map(|i| Session {
            id: format!("s-{i}"),
            description: format!("session {i}"),
            notes: String::new(),
            task_id: None,
        })
        .collect();
    let timeframes = (0..count)
        .map(|i| {
            let start = base + Duration::minutes(i as i64 * 30);
            Timeframe {
                id: format!("tf-{i}"),
                session_id: format!("s-{i}"),
                start,
                end: start + Duration::minutes(25),
                done: true,
            }
        })
        .collect();
    Snapshot {
        sessions,
        timeframes,
        tasks: Vec::new(),
    }
}

/// Builds store input for one session with a single finished timeframe.
pub fn new_session(i: usize) -> NewSession {
    let start = base_instant() + Duration::minutes(i as i64 * 30);
    NewSession {
        description: format!("session {i}"),
        notes: String::new(),
        task_id: None,
        timeframes: vec![NewTimeframe {
            start,
            end: start + Duration::minutes(25),
            done: true,
        }],
    }
}
