//! Timeframe commands.

use super::parse_instant;
use std::path::Path;
use stint_store::{Database, NewTimeframe};

/// Adds a timeframe to a session and prints its ID.
pub fn add(
    db_path: &Path,
    session_id: &str,
    from: &str,
    to: &str,
    done: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let id = db.add_timeframe(
        session_id,
        NewTimeframe {
            start: parse_instant(from)?,
            end: parse_instant(to)?,
            done,
        },
    )?;
    println!("{id}");
    Ok(())
}

/// Lists a session's timeframes in chronological order.
pub fn list(db_path: &Path, session_id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let frames = db.session_timeframes(session_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(());
    }

    for frame in &frames {
        let state = if frame.done { "done" } else { "open" };
        println!(
            "{}  {} .. {}  {}",
            frame.id,
            frame.start.to_rfc3339(),
            frame.end.to_rfc3339(),
            state
        );
    }
    Ok(())
}

/// Marks a timeframe finished.
pub fn done(db_path: &Path, session_id: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let mut frame = db
        .session_timeframes(session_id)?
        .into_iter()
        .find(|frame| frame.id == id)
        .ok_or_else(|| format!("no timeframe {id} in session {session_id}"))?;
    frame.done = true;
    db.edit_timeframe(&frame)?;
    Ok(())
}
