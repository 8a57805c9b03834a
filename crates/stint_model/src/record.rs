//! Record identity.

use std::fmt;

/// A synchronized record.
///
/// Every record carries a globally unique textual identifier that is
/// immutable for the record's lifetime. The identifier is the merge key;
/// everything else is payload compared by value equality.
pub trait Record {
    /// Returns the record's stable identifier.
    fn id(&self) -> &str;
}

/// The three synchronized record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A session of some activity.
    Session,
    /// A contiguous span of time within a session.
    Timeframe,
    /// A task a session may reference.
    Task,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Session => "session",
            RecordKind::Timeframe => "timeframe",
            RecordKind::Task => "task",
        };
        f.write_str(name)
    }
}
