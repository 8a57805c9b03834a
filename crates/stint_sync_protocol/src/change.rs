//! Change operations and changesets.

use serde::{Deserialize, Serialize};
use stint_model::{Session, Task, Timeframe};
use thiserror::Error;

use crate::wire::nullable_vec;

/// Errors arising from malformed protocol values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A change carried an operation code this version does not know.
    #[error("unknown change operation code {0}")]
    UnknownOperation(u8),
}

/// What a change does to the record it carries.
///
/// Operation codes are fixed by the wire format: `0` asserts the record
/// exists with the carried field values, `1` removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChangeOp {
    /// The record exists with exactly the carried field values.
    Exist,
    /// The record is deleted; the carried value identifies it.
    Remove,
}

impl From<ChangeOp> for u8 {
    fn from(op: ChangeOp) -> u8 {
        match op {
            ChangeOp::Exist => 0,
            ChangeOp::Remove => 1,
        }
    }
}

impl TryFrom<u8> for ChangeOp {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ChangeOp::Exist),
            1 => Ok(ChangeOp::Remove),
            other => Err(ProtocolError::UnknownOperation(other)),
        }
    }
}

impl std::fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeOp::Exist => write!(f, "exist"),
            ChangeOp::Remove => write!(f, "remove"),
        }
    }
}

/// A single correction to one record on a replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change<T> {
    /// Whether the record is asserted or removed.
    pub operation: ChangeOp,
    /// The record the operation applies to.
    pub data: T,
}

impl<T> Change<T> {
    /// Asserts that `data` exists with exactly these field values.
    pub fn exist(data: T) -> Self {
        Change {
            operation: ChangeOp::Exist,
            data,
        }
    }

    /// Removes the record identified by `data`.
    pub fn remove(data: T) -> Self {
        Change {
            operation: ChangeOp::Remove,
            data,
        }
    }
}

/// Corrections for every record kind, applied to a replica in one batch.
///
/// Missing or `null` arrays decode as empty, so changesets from peers
/// that omit untouched kinds are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Changeset {
    /// Session corrections.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub sessions: Vec<Change<Session>>,
    /// Timeframe corrections.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub timeframes: Vec<Change<Timeframe>>,
    /// Task corrections.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tasks: Vec<Change<Task>>,
}

impl Changeset {
    /// Returns true when no corrections are present for any kind.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.timeframes.is_empty() && self.tasks.is_empty()
    }

    /// Total number of corrections across all kinds.
    pub fn len(&self) -> usize {
        self.sessions.len() + self.timeframes.len() + self.tasks.len()
    }

    /// Appends all corrections from `other`, kind by kind.
    pub fn append(&mut self, other: Changeset) {
        self.sessions.extend(other.sessions);
        self.timeframes.extend(other.timeframes);
        self.tasks.extend(other.tasks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, description: &str) -> Session {
        Session {
            id: id.into(),
            description: description.into(),
            notes: String::new(),
            task_id: None,
        }
    }

    #[test]
    fn operation_codes_round_trip() {
        assert_eq!(serde_json::to_string(&ChangeOp::Exist).unwrap(), "0");
        assert_eq!(serde_json::to_string(&ChangeOp::Remove).unwrap(), "1");
        assert_eq!(serde_json::from_str::<ChangeOp>("0").unwrap(), ChangeOp::Exist);
        assert_eq!(serde_json::from_str::<ChangeOp>("1").unwrap(), ChangeOp::Remove);
    }

    #[test]
    fn unknown_operation_code_is_rejected() {
        let err = serde_json::from_str::<ChangeOp>("7").unwrap_err();
        assert!(err.to_string().contains("unknown change operation code 7"));
    }

    #[test]
    fn operation_display() {
        assert_eq!(ChangeOp::Exist.to_string(), "exist");
        assert_eq!(ChangeOp::Remove.to_string(), "remove");
    }

    #[test]
    fn change_wire_keys() {
        let change = Change::exist(session("s1", "write docs"));
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["Operation"], 0);
        assert_eq!(value["Data"]["ID"], "s1");
    }

    #[test]
    fn changeset_wire_keys() {
        let changeset = Changeset {
            sessions: vec![Change::remove(session("s1", "write docs"))],
            ..Changeset::default()
        };
        let value = serde_json::to_value(&changeset).unwrap();
        assert_eq!(value["Sessions"][0]["Operation"], 1);
        assert!(value["Timeframes"].as_array().unwrap().is_empty());
        assert!(value["Tasks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn null_arrays_decode_as_empty() {
        let decoded: Changeset =
            serde_json::from_str(r#"{"Sessions":null,"Timeframes":null,"Tasks":null}"#).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn missing_arrays_decode_as_empty() {
        let decoded: Changeset = serde_json::from_str("{}").unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.len(), 0);
    }

    #[test]
    fn append_extends_each_kind() {
        let mut target = Changeset {
            sessions: vec![Change::exist(session("s1", "a"))],
            ..Changeset::default()
        };
        let extra = Changeset {
            sessions: vec![Change::exist(session("s2", "b"))],
            tasks: vec![Change::remove(stint_model::Task {
                id: "t1".into(),
                description: "c".into(),
            })],
            ..Changeset::default()
        };
        target.append(extra);
        assert_eq!(target.sessions.len(), 2);
        assert_eq!(target.tasks.len(), 1);
        assert_eq!(target.len(), 3);
    }
}
