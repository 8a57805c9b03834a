//! Session commands.

use super::parse_instant;
use std::path::Path;
use stint_store::{Database, NewSession, NewTimeframe};

/// Adds a session and prints its ID. When `from` and `to` are given,
/// the session starts out with one finished timeframe covering them.
pub fn add(
    db_path: &Path,
    description: &str,
    notes: &str,
    task_id: Option<String>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let timeframes = match (from, to) {
        (Some(from), Some(to)) => vec![NewTimeframe {
            start: parse_instant(from)?,
            end: parse_instant(to)?,
            done: true,
        }],
        _ => Vec::new(),
    };

    let db = Database::open(db_path)?;
    let id = db.add_session(NewSession {
        description: description.to_string(),
        notes: notes.to_string(),
        task_id,
        timeframes,
    })?;
    println!("{id}");
    Ok(())
}

/// Lists sessions, most recent activity first.
pub fn list(
    db_path: &Path,
    limit: u32,
    offset: u32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let sessions = db.get_latest_sessions(limit, offset)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    for session in &sessions {
        match &session.task_id {
            Some(task_id) => println!(
                "{}  {}  (task {})",
                session.id, session.description, task_id
            ),
            None => println!("{}  {}", session.id, session.description),
        }
    }
    Ok(())
}

/// Replaces a session's notes.
pub fn note(db_path: &Path, id: &str, notes: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let mut session = db.get_session(id)?;
    session.notes = notes.to_string();
    db.edit_session(&session)?;
    Ok(())
}
