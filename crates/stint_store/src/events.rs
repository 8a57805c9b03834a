//! Store change notifications.

use std::sync::mpsc::{channel, Receiver, Sender};

use parking_lot::Mutex;
use stint_model::RecordKind;
use stint_sync_protocol::ChangeOp;

/// A committed mutation of the store.
///
/// Events fire after the transaction commits, never before, so a
/// subscriber that re-reads the store always sees the new state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// One record changed. `op` is `Exist` for inserts and edits,
    /// `Remove` for deletions.
    Mutated {
        /// Which kind of record changed.
        kind: RecordKind,
        /// The record's ID.
        id: String,
        /// What happened to it.
        op: ChangeOp,
    },
    /// The whole store was swapped out by a sync round.
    Replaced,
}

/// Fan-out of store events to any number of subscribers.
#[derive(Debug, Default)]
pub(crate) struct EventHub {
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl EventHub {
    /// Registers a new subscriber.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (sender, receiver) = channel();
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Delivers `event` to every live subscriber, dropping closed ones.
    pub fn emit(&self, event: StoreEvent) {
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
