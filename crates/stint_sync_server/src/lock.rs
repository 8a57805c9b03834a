//! The advisory database lock.
//!
//! Sync rounds hold this lock for their whole exchange so two clients
//! never interleave snapshot downloads and changeset uploads. The lock
//! is advisory: data endpoints do not check it, the client protocol
//! honors it.

use crate::error::{ServerError, ServerResult};
use parking_lot::Mutex;
use tracing::debug;

/// Exclusive lock identified by the holder's client name.
pub trait AdvisoryLock: Send + Sync {
    /// Acquires the lock for `identity`. Fails while anyone holds it,
    /// the same identity included; a round that lost its lock state
    /// must wait for the release, not silently re-enter.
    fn try_acquire(&self, identity: &str) -> ServerResult<()>;

    /// Releases the lock. Only the current holder may release.
    fn release(&self, identity: &str) -> ServerResult<()>;

    /// Returns the current holder's name.
    fn holder(&self) -> Option<String>;
}

/// In-process lock. State is lost on restart, which unsticks any
/// client that crashed while holding it.
#[derive(Debug, Default)]
pub struct LocalLock {
    holder: Mutex<Option<String>>,
}

impl LocalLock {
    /// Creates an unheld lock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdvisoryLock for LocalLock {
    fn try_acquire(&self, identity: &str) -> ServerResult<()> {
        let mut holder = self.holder.lock();
        match holder.as_deref() {
            Some(current) => Err(ServerError::Locked {
                holder: current.to_string(),
            }),
            None => {
                *holder = Some(identity.to_string());
                debug!(identity, "lock acquired");
                Ok(())
            }
        }
    }

    fn release(&self, identity: &str) -> ServerResult<()> {
        let mut holder = self.holder.lock();
        match holder.as_deref() {
            Some(current) if current == identity => {
                *holder = None;
                debug!(identity, "lock released");
                Ok(())
            }
            _ => Err(ServerError::NotHolder {
                identity: identity.to_string(),
            }),
        }
    }

    fn holder(&self) -> Option<String> {
        self.holder.lock().clone()
    }
}
