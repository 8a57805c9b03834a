//! SQLite-backed record store.

use std::path::Path;
use std::sync::mpsc::Receiver;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use stint_model::{RecordKind, Session, Task, Timeframe};
use stint_sync_protocol::{ChangeOp, Changeset, Snapshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::events::{EventHub, StoreEvent};
use crate::migrations::apply_migrations;

/// Handle to one stint database.
///
/// All methods take `&self`; access to the underlying connection is
/// serialized through an internal lock, so a `Database` can be shared
/// across threads behind an `Arc`.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    events: EventHub,
}

/// Input to [`Database::add_session`].
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    /// Human description of the work.
    pub description: String,
    /// Free-form notes.
    pub notes: String,
    /// Optional task the session belongs to.
    pub task_id: Option<String>,
    /// Initial timeframes, inserted in the same transaction.
    pub timeframes: Vec<NewTimeframe>,
}

/// Input to [`Database::add_timeframe`].
#[derive(Debug, Clone, Copy)]
pub struct NewTimeframe {
    /// When the work started.
    pub start: DateTime<Utc>,
    /// When the work stopped.
    pub end: DateTime<Utc>,
    /// Whether the frame is finalized.
    pub done: bool,
}

impl Database {
    /// Opens (creating if necessary) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Database, StoreError> {
        info!(path = %path.as_ref().display(), "opening store");
        Database::bootstrap(Connection::open(path.as_ref())?)
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> Result<Database, StoreError> {
        Database::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(mut conn: Connection) -> Result<Database, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        apply_migrations(&mut conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
            events: EventHub::default(),
        })
    }

    /// Subscribes to committed-mutation events.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn notify(&self, kind: RecordKind, id: impl Into<String>, op: ChangeOp) {
        self.events.emit(StoreEvent::Mutated {
            kind,
            id: id.into(),
            op,
        });
    }

    // --- sessions ---

    /// Inserts a session (and its initial timeframes) and returns the
    /// generated session ID.
    pub fn add_session(&self, new: NewSession) -> Result<String, StoreError> {
        let (session_id, frame_ids) = {
            let mut conn = self.conn.lock();
            let tx = conn.transaction()?;
            let session_id = new_id();
            tx.execute(
                "INSERT INTO sessions (id, description, notes, task_id) VALUES (?1, ?2, ?3, ?4)",
                params![session_id, new.description, new.notes, new.task_id],
            )?;
            let mut frame_ids = Vec::with_capacity(new.timeframes.len());
            for frame in &new.timeframes {
                let frame_id = new_id();
                tx.execute(
                    "INSERT INTO time_frames (id, session_id, start_time, end_time, done)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        frame_id,
                        session_id,
                        datetime_to_sql(&frame.start),
                        datetime_to_sql(&frame.end),
                        frame.done,
                    ],
                )?;
                frame_ids.push(frame_id);
            }
            tx.commit()?;
            (session_id, frame_ids)
        };
        self.notify(RecordKind::Session, session_id.clone(), ChangeOp::Exist);
        for frame_id in frame_ids {
            self.notify(RecordKind::Timeframe, frame_id, ChangeOp::Exist);
        }
        Ok(session_id)
    }

    /// Looks up one session by ID.
    pub fn get_session(&self, id: &str) -> Result<Session, StoreError> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, description, notes, task_id FROM sessions WHERE id = ?1",
                [id],
                session_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(RecordKind::Session, id))
    }

    /// Lists sessions ordered by most recent activity, newest first.
    ///
    /// Activity is the session's latest timeframe end; sessions with no
    /// timeframes sort last.
    pub fn get_latest_sessions(&self, limit: u32, offset: u32) -> Result<Vec<Session>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, description, notes, task_id FROM sessions
             ORDER BY (SELECT MAX(end_time) FROM time_frames
                       WHERE session_id = sessions.id) DESC
             LIMIT ?1 OFFSET ?2",
        )?;
        let mut rows = stmt.query(params![limit, offset])?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(session_from_row(row)?);
        }
        Ok(sessions)
    }

    /// Updates a session's description, notes, and task reference.
    pub fn edit_session(&self, session: &Session) -> Result<(), StoreError> {
        let changed = self.conn.lock().execute(
            "UPDATE sessions SET description = ?1, notes = ?2, task_id = ?3 WHERE id = ?4",
            params![
                session.description,
                session.notes,
                session.task_id,
                session.id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(RecordKind::Session, &session.id));
        }
        self.notify(RecordKind::Session, &session.id, ChangeOp::Exist);
        Ok(())
    }

    /// Deletes a session together with its timeframes.
    pub fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let frame_ids = {
            let mut conn = self.conn.lock();
            let tx = conn.transaction()?;
            let frame_ids = session_frame_ids(&tx, id)?;
            tx.execute("DELETE FROM time_frames WHERE session_id = ?1", [id])?;
            let changed = tx.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(StoreError::not_found(RecordKind::Session, id));
            }
            tx.commit()?;
            frame_ids
        };
        for frame_id in frame_ids {
            self.notify(RecordKind::Timeframe, frame_id, ChangeOp::Remove);
        }
        self.notify(RecordKind::Session, id, ChangeOp::Remove);
        Ok(())
    }

    /// Moves the end of the session's latest timeframe to `to`.
    pub fn extend_session(&self, session_id: &str, to: DateTime<Utc>) -> Result<(), StoreError> {
        let frame_id = {
            let mut conn = self.conn.lock();
            let tx = conn.transaction()?;
            let frame_id: Option<String> = tx
                .query_row(
                    "SELECT id FROM time_frames WHERE session_id = ?1
                     ORDER BY end_time DESC LIMIT 1",
                    [session_id],
                    |row| row.get(0),
                )
                .optional()?;
            let frame_id = match frame_id {
                Some(frame_id) => frame_id,
                None => return Err(StoreError::NoTimeframes(session_id.to_owned())),
            };
            tx.execute(
                "UPDATE time_frames SET end_time = ?1 WHERE id = ?2",
                params![datetime_to_sql(&to), frame_id],
            )?;
            tx.commit()?;
            frame_id
        };
        self.notify(RecordKind::Timeframe, frame_id, ChangeOp::Exist);
        Ok(())
    }

    /// Lists a session's timeframes ordered by start.
    pub fn session_timeframes(&self, session_id: &str) -> Result<Vec<Timeframe>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, start_time, end_time, done FROM time_frames
             WHERE session_id = ?1 ORDER BY start_time, id",
        )?;
        let mut rows = stmt.query([session_id])?;
        let mut frames = Vec::new();
        while let Some(row) = rows.next()? {
            frames.push(timeframe_from_row(row)?);
        }
        Ok(frames)
    }

    // --- timeframes ---

    /// Inserts a timeframe for an existing session and returns the
    /// generated timeframe ID.
    pub fn add_timeframe(&self, session_id: &str, new: NewTimeframe) -> Result<String, StoreError> {
        let frame_id = {
            let conn = self.conn.lock();
            let exists: Option<i64> = conn
                .query_row("SELECT 1 FROM sessions WHERE id = ?1", [session_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::not_found(RecordKind::Session, session_id));
            }
            let frame_id = new_id();
            conn.execute(
                "INSERT INTO time_frames (id, session_id, start_time, end_time, done)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    frame_id,
                    session_id,
                    datetime_to_sql(&new.start),
                    datetime_to_sql(&new.end),
                    new.done,
                ],
            )?;
            frame_id
        };
        self.notify(RecordKind::Timeframe, frame_id.clone(), ChangeOp::Exist);
        Ok(frame_id)
    }

    /// Updates a timeframe's start, end, and done flag. The frame is
    /// addressed by its own ID scoped to its session ID.
    pub fn edit_timeframe(&self, frame: &Timeframe) -> Result<(), StoreError> {
        let changed = self.conn.lock().execute(
            "UPDATE time_frames SET start_time = ?1, end_time = ?2, done = ?3
             WHERE id = ?4 AND session_id = ?5",
            params![
                datetime_to_sql(&frame.start),
                datetime_to_sql(&frame.end),
                frame.done,
                frame.id,
                frame.session_id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(RecordKind::Timeframe, &frame.id));
        }
        self.notify(RecordKind::Timeframe, &frame.id, ChangeOp::Exist);
        Ok(())
    }

    /// Deletes one timeframe of one session.
    pub fn delete_timeframe(&self, session_id: &str, timeframe_id: &str) -> Result<(), StoreError> {
        let changed = self.conn.lock().execute(
            "DELETE FROM time_frames WHERE id = ?1 AND session_id = ?2",
            params![timeframe_id, session_id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(RecordKind::Timeframe, timeframe_id));
        }
        self.notify(RecordKind::Timeframe, timeframe_id, ChangeOp::Remove);
        Ok(())
    }

    // --- tasks ---

    /// Inserts a task and returns the generated task ID.
    pub fn add_task(&self, description: &str) -> Result<String, StoreError> {
        let task_id = new_id();
        self.conn.lock().execute(
            "INSERT INTO tasks (id, description) VALUES (?1, ?2)",
            params![task_id, description],
        )?;
        self.notify(RecordKind::Task, task_id.clone(), ChangeOp::Exist);
        Ok(task_id)
    }

    /// Looks up one task by ID.
    pub fn get_task(&self, id: &str) -> Result<Task, StoreError> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, description FROM tasks WHERE id = ?1",
                [id],
                task_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(RecordKind::Task, id))
    }

    /// Lists all tasks, ordered by description.
    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, description FROM tasks ORDER BY description, id")?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(task_from_row(row)?);
        }
        Ok(tasks)
    }

    /// Deletes one task. Sessions referencing it keep their reference.
    pub fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let changed = self
            .conn
            .lock()
            .execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(StoreError::not_found(RecordKind::Task, id));
        }
        self.notify(RecordKind::Task, id, ChangeOp::Remove);
        Ok(())
    }

    // --- sync surface ---

    /// Exports every record, each kind ordered by ID.
    pub fn export(&self) -> Result<Snapshot, StoreError> {
        let conn = self.conn.lock();
        Ok(Snapshot {
            sessions: select_sessions(&conn)?,
            timeframes: select_timeframes(&conn)?,
            tasks: select_tasks(&conn)?,
        })
    }

    /// Applies a changeset in one transaction: `Exist` upserts the
    /// carried record, `Remove` deletes by ID.
    pub fn import_changes(&self, changes: &Changeset) -> Result<(), StoreError> {
        debug!(corrections = changes.len(), "importing changes");
        {
            let mut conn = self.conn.lock();
            let tx = conn.transaction()?;
            apply_changes(&tx, changes)?;
            tx.commit()?;
        }
        self.emit_changes(changes);
        Ok(())
    }

    /// Replaces every record with `snapshot`, then applies `changes`,
    /// in one transaction.
    pub fn replace_and_import(
        &self,
        snapshot: &Snapshot,
        changes: &Changeset,
    ) -> Result<(), StoreError> {
        info!(
            records = snapshot.record_count(),
            corrections = changes.len(),
            "replacing store contents"
        );
        {
            let mut conn = self.conn.lock();
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM sessions", [])?;
            tx.execute("DELETE FROM time_frames", [])?;
            tx.execute("DELETE FROM tasks", [])?;
            for session in &snapshot.sessions {
                upsert_session(&tx, session)?;
            }
            for frame in &snapshot.timeframes {
                upsert_timeframe(&tx, frame)?;
            }
            for task in &snapshot.tasks {
                upsert_task(&tx, task)?;
            }
            apply_changes(&tx, changes)?;
            tx.commit()?;
        }
        self.events.emit(StoreEvent::Replaced);
        Ok(())
    }

    fn emit_changes(&self, changes: &Changeset) {
        for change in &changes.sessions {
            self.notify(RecordKind::Session, &change.data.id, change.operation);
        }
        for change in &changes.timeframes {
            self.notify(RecordKind::Timeframe, &change.data.id, change.operation);
        }
        for change in &changes.tasks {
            self.notify(RecordKind::Task, &change.data.id, change.operation);
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fixed-width form: lexicographic order on the stored text matches
/// chronological order, which `MAX(end_time)` relies on.
fn datetime_to_sql(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn datetime_from_sql(text: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| StoreError::InvalidData(format!("timestamp `{text}`: {err}")))
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        description: row.get("description")?,
        notes: row.get("notes")?,
        task_id: row.get("task_id")?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        description: row.get("description")?,
    })
}

fn timeframe_from_row(row: &Row<'_>) -> Result<Timeframe, StoreError> {
    let start: String = row.get("start_time")?;
    let end: String = row.get("end_time")?;
    Ok(Timeframe {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        start: datetime_from_sql(&start)?,
        end: datetime_from_sql(&end)?,
        done: row.get("done")?,
    })
}

fn session_frame_ids(tx: &Transaction<'_>, session_id: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = tx.prepare("SELECT id FROM time_frames WHERE session_id = ?1")?;
    let mut rows = stmt.query([session_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn select_sessions(conn: &Connection) -> Result<Vec<Session>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT id, description, notes, task_id FROM sessions ORDER BY id")?;
    let mut rows = stmt.query([])?;
    let mut sessions = Vec::new();
    while let Some(row) = rows.next()? {
        sessions.push(session_from_row(row)?);
    }
    Ok(sessions)
}

fn select_timeframes(conn: &Connection) -> Result<Vec<Timeframe>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT id, session_id, start_time, end_time, done FROM time_frames ORDER BY id")?;
    let mut rows = stmt.query([])?;
    let mut frames = Vec::new();
    while let Some(row) = rows.next()? {
        frames.push(timeframe_from_row(row)?);
    }
    Ok(frames)
}

fn select_tasks(conn: &Connection) -> Result<Vec<Task>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, description FROM tasks ORDER BY id")?;
    let mut rows = stmt.query([])?;
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(task_from_row(row)?);
    }
    Ok(tasks)
}

fn upsert_session(tx: &Transaction<'_>, session: &Session) -> Result<(), StoreError> {
    tx.execute(
        "REPLACE INTO sessions (id, description, notes, task_id) VALUES (?1, ?2, ?3, ?4)",
        params![
            session.id,
            session.description,
            session.notes,
            session.task_id
        ],
    )?;
    Ok(())
}

fn upsert_timeframe(tx: &Transaction<'_>, frame: &Timeframe) -> Result<(), StoreError> {
    tx.execute(
        "REPLACE INTO time_frames (id, session_id, start_time, end_time, done)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            frame.id,
            frame.session_id,
            datetime_to_sql(&frame.start),
            datetime_to_sql(&frame.end),
            frame.done,
        ],
    )?;
    Ok(())
}

fn upsert_task(tx: &Transaction<'_>, task: &Task) -> Result<(), StoreError> {
    tx.execute(
        "REPLACE INTO tasks (id, description) VALUES (?1, ?2)",
        params![task.id, task.description],
    )?;
    Ok(())
}

fn apply_changes(tx: &Transaction<'_>, changes: &Changeset) -> Result<(), StoreError> {
    for change in &changes.sessions {
        match change.operation {
            ChangeOp::Exist => {
                upsert_session(tx, &change.data)?;
            }
            ChangeOp::Remove => {
                tx.execute(
                    "DELETE FROM sessions WHERE id = ?1",
                    [change.data.id.as_str()],
                )?;
            }
        }
    }
    for change in &changes.timeframes {
        match change.operation {
            ChangeOp::Exist => {
                upsert_timeframe(tx, &change.data)?;
            }
            ChangeOp::Remove => {
                tx.execute(
                    "DELETE FROM time_frames WHERE id = ?1",
                    [change.data.id.as_str()],
                )?;
            }
        }
    }
    for change in &changes.tasks {
        match change.operation {
            ChangeOp::Exist => {
                upsert_task(tx, &change.data)?;
            }
            ChangeOp::Remove => {
                tx.execute("DELETE FROM tasks WHERE id = ?1", [change.data.id.as_str()])?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use stint_sync_protocol::Change;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    fn frame_input(start: DateTime<Utc>, end: DateTime<Utc>) -> NewTimeframe {
        NewTimeframe {
            start,
            end,
            done: false,
        }
    }

    #[test]
    fn session_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let task_id = db.add_task("ship release").unwrap();
        let session_id = db
            .add_session(NewSession {
                description: "deep work".into(),
                notes: "parser rewrite".into(),
                task_id: Some(task_id.clone()),
                timeframes: vec![frame_input(at(9, 0), at(10, 30))],
            })
            .unwrap();

        let session = db.get_session(&session_id).unwrap();
        assert_eq!(session.description, "deep work");
        assert_eq!(session.notes, "parser rewrite");
        assert_eq!(session.task_id, Some(task_id));

        let frames = db.session_timeframes(&session_id).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].session_id, session_id);
        assert_eq!(frames[0].start, at(9, 0));
        assert_eq!(frames[0].end, at(10, 30));
        assert!(!frames[0].done);
    }

    #[test]
    fn missing_session_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_session("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn subsecond_timestamps_survive_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let start = at(9, 0) + Duration::nanoseconds(123_456_789);
        let end = at(9, 30) + Duration::nanoseconds(987_654_321);
        let session_id = db
            .add_session(NewSession {
                description: "precise".into(),
                timeframes: vec![frame_input(start, end)],
                ..NewSession::default()
            })
            .unwrap();

        let frames = db.session_timeframes(&session_id).unwrap();
        assert_eq!(frames[0].start, start);
        assert_eq!(frames[0].end, end);
    }

    #[test]
    fn latest_sessions_order_by_recent_activity() {
        let db = Database::open_in_memory().unwrap();
        let morning = db
            .add_session(NewSession {
                description: "morning".into(),
                timeframes: vec![frame_input(at(9, 0), at(10, 0))],
                ..NewSession::default()
            })
            .unwrap();
        let evening = db
            .add_session(NewSession {
                description: "evening".into(),
                timeframes: vec![frame_input(at(18, 0), at(19, 0))],
                ..NewSession::default()
            })
            .unwrap();
        let idle = db
            .add_session(NewSession {
                description: "idle".into(),
                ..NewSession::default()
            })
            .unwrap();

        let all = db.get_latest_sessions(10, 0).unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![evening.as_str(), morning.as_str(), idle.as_str()]);

        let page = db.get_latest_sessions(1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, morning);
    }

    #[test]
    fn edit_session_updates_fields() {
        let db = Database::open_in_memory().unwrap();
        let session_id = db
            .add_session(NewSession {
                description: "before".into(),
                ..NewSession::default()
            })
            .unwrap();
        let mut session = db.get_session(&session_id).unwrap();
        session.description = "after".into();
        session.notes = "edited".into();
        db.edit_session(&session).unwrap();
        assert_eq!(db.get_session(&session_id).unwrap(), session);

        let ghost = Session {
            id: "ghost".into(),
            ..Session::default()
        };
        assert!(db.edit_session(&ghost).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_session_removes_its_timeframes() {
        let db = Database::open_in_memory().unwrap();
        let session_id = db
            .add_session(NewSession {
                description: "doomed".into(),
                timeframes: vec![frame_input(at(9, 0), at(10, 0))],
                ..NewSession::default()
            })
            .unwrap();
        db.delete_session(&session_id).unwrap();
        assert!(db.get_session(&session_id).unwrap_err().is_not_found());
        let snapshot = db.export().unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn extend_session_moves_only_the_latest_frame() {
        let db = Database::open_in_memory().unwrap();
        let session_id = db
            .add_session(NewSession {
                description: "long haul".into(),
                timeframes: vec![
                    frame_input(at(9, 0), at(10, 0)),
                    frame_input(at(11, 0), at(12, 0)),
                ],
                ..NewSession::default()
            })
            .unwrap();
        db.extend_session(&session_id, at(13, 0)).unwrap();

        let frames = db.session_timeframes(&session_id).unwrap();
        assert_eq!(frames[0].end, at(10, 0));
        assert_eq!(frames[1].end, at(13, 0));
    }

    #[test]
    fn extend_session_without_frames_fails() {
        let db = Database::open_in_memory().unwrap();
        let session_id = db
            .add_session(NewSession {
                description: "empty".into(),
                ..NewSession::default()
            })
            .unwrap();
        let err = db.extend_session(&session_id, at(13, 0)).unwrap_err();
        assert!(matches!(err, StoreError::NoTimeframes(_)));
    }

    #[test]
    fn timeframes_are_scoped_to_their_session() {
        let db = Database::open_in_memory().unwrap();
        let session_id = db
            .add_session(NewSession {
                description: "own".into(),
                ..NewSession::default()
            })
            .unwrap();
        let frame_id = db
            .add_timeframe(&session_id, frame_input(at(9, 0), at(10, 0)))
            .unwrap();

        let mut frame = db.session_timeframes(&session_id).unwrap().remove(0);
        frame.session_id = "someone-else".into();
        assert!(db.edit_timeframe(&frame).unwrap_err().is_not_found());

        assert!(db
            .delete_timeframe("someone-else", &frame_id)
            .unwrap_err()
            .is_not_found());
        db.delete_timeframe(&session_id, &frame_id).unwrap();
        assert!(db.session_timeframes(&session_id).unwrap().is_empty());
    }

    #[test]
    fn add_timeframe_requires_the_session() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .add_timeframe("nope", frame_input(at(9, 0), at(10, 0)))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn edit_timeframe_updates_done() {
        let db = Database::open_in_memory().unwrap();
        let session_id = db
            .add_session(NewSession {
                description: "flag".into(),
                timeframes: vec![frame_input(at(9, 0), at(10, 0))],
                ..NewSession::default()
            })
            .unwrap();
        let mut frame = db.session_timeframes(&session_id).unwrap().remove(0);
        frame.done = true;
        frame.end = at(10, 15);
        db.edit_timeframe(&frame).unwrap();
        assert_eq!(db.session_timeframes(&session_id).unwrap()[0], frame);
    }

    #[test]
    fn tasks_crud() {
        let db = Database::open_in_memory().unwrap();
        let b = db.add_task("beta").unwrap();
        let a = db.add_task("alpha").unwrap();

        assert_eq!(db.get_task(&a).unwrap().description, "alpha");
        let listed: Vec<String> = db
            .list_tasks()
            .unwrap()
            .into_iter()
            .map(|task| task.id)
            .collect();
        assert_eq!(listed, vec![a.clone(), b.clone()]);

        db.delete_task(&b).unwrap();
        assert!(db.get_task(&b).unwrap_err().is_not_found());
        assert!(db.delete_task(&b).unwrap_err().is_not_found());
    }

    #[test]
    fn import_changes_upserts_and_deletes() {
        let db = Database::open_in_memory().unwrap();
        let keep = db.add_task("keep").unwrap();
        let gone = db.add_task("gone").unwrap();

        let changes = Changeset {
            tasks: vec![
                Change::exist(Task {
                    id: keep.clone(),
                    description: "kept and renamed".into(),
                }),
                Change::remove(Task {
                    id: gone.clone(),
                    description: String::new(),
                }),
            ],
            ..Changeset::default()
        };
        db.import_changes(&changes).unwrap();

        assert_eq!(db.get_task(&keep).unwrap().description, "kept and renamed");
        assert!(db.get_task(&gone).unwrap_err().is_not_found());
    }

    #[test]
    fn replace_and_import_swaps_everything() {
        let db = Database::open_in_memory().unwrap();
        db.add_task("stale").unwrap();

        let incoming = Snapshot {
            sessions: vec![Session {
                id: "s1".into(),
                description: "imported".into(),
                notes: String::new(),
                task_id: None,
            }],
            timeframes: vec![Timeframe {
                id: "f1".into(),
                session_id: "s1".into(),
                start: at(9, 0),
                end: at(10, 0),
                done: true,
            }],
            tasks: vec![Task {
                id: "t1".into(),
                description: "fresh".into(),
            }],
        };
        let corrections = Changeset {
            tasks: vec![Change::remove(Task {
                id: "t1".into(),
                description: String::new(),
            })],
            ..Changeset::default()
        };
        db.replace_and_import(&incoming, &corrections).unwrap();

        let snapshot = db.export().unwrap();
        assert_eq!(snapshot.sessions, incoming.sessions);
        assert_eq!(snapshot.timeframes, incoming.timeframes);
        assert!(snapshot.tasks.is_empty());
    }

    #[test]
    fn events_follow_commits() {
        let db = Database::open_in_memory().unwrap();
        let events = db.subscribe();

        let task_id = db.add_task("observed").unwrap();
        db.delete_task(&task_id).unwrap();
        db.replace_and_import(&Snapshot::default(), &Changeset::default())
            .unwrap();

        let seen: Vec<StoreEvent> = events.try_iter().collect();
        assert_eq!(
            seen,
            vec![
                StoreEvent::Mutated {
                    kind: RecordKind::Task,
                    id: task_id.clone(),
                    op: ChangeOp::Exist,
                },
                StoreEvent::Mutated {
                    kind: RecordKind::Task,
                    id: task_id,
                    op: ChangeOp::Remove,
                },
                StoreEvent::Replaced,
            ]
        );
    }

    #[test]
    fn failed_mutations_emit_nothing() {
        let db = Database::open_in_memory().unwrap();
        let events = db.subscribe();
        assert!(db.delete_task("nope").is_err());
        assert!(events.try_iter().next().is_none());
    }

    #[test]
    fn reopening_a_file_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stint.db");
        let task_id = {
            let db = Database::open(&path).unwrap();
            db.add_task("durable").unwrap()
        };
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_task(&task_id).unwrap().description, "durable");
    }

    #[test]
    fn future_schema_versions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stint.db");
        drop(Database::open(&path).unwrap());

        let raw = Connection::open(&path).unwrap();
        raw.execute_batch("PRAGMA user_version = 99;").unwrap();
        drop(raw);

        let err = Database::open(&path).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedSchemaVersion { found: 99, .. }
        ));
    }
}
