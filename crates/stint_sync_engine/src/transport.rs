//! Transport layer abstraction for sync rounds.

use crate::error::{SyncError, SyncResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use stint_sync_protocol::{Changeset, Snapshot};

/// A sync transport handles communication with the sync server.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-process for testing, etc.).
pub trait SyncTransport: Send + Sync {
    /// Acquires the server's advisory lock.
    fn lock(&self) -> SyncResult<()>;

    /// Releases the server's advisory lock.
    fn unlock(&self) -> SyncResult<()>;

    /// Downloads the server's full snapshot.
    fn fetch_snapshot(&self) -> SyncResult<Snapshot>;

    /// Uploads corrections for the server to apply.
    fn push_changes(&self, changes: &Changeset) -> SyncResult<()>;
}

/// A mock transport for testing.
///
/// Behaves like a server whose snapshot is set up front. Failures are
/// injected per call with the `fail_*` setters; each injected error is
/// consumed by the next matching call.
#[derive(Debug, Default)]
pub struct MockTransport {
    snapshot: Mutex<Snapshot>,
    pushed: Mutex<Vec<Changeset>>,
    lock_calls: AtomicUsize,
    unlock_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    lock_error: Mutex<Option<SyncError>>,
    unlock_error: Mutex<Option<SyncError>>,
    fetch_error: Mutex<Option<SyncError>>,
    push_error: Mutex<Option<SyncError>>,
}

impl MockTransport {
    /// Creates a new mock transport serving an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the snapshot returned by [`SyncTransport::fetch_snapshot`].
    pub fn set_snapshot(&self, snapshot: Snapshot) {
        *self.snapshot.lock() = snapshot;
    }

    /// Makes the next `lock` call fail with `error`.
    pub fn fail_lock(&self, error: SyncError) {
        *self.lock_error.lock() = Some(error);
    }

    /// Makes the next `unlock` call fail with `error`.
    pub fn fail_unlock(&self, error: SyncError) {
        *self.unlock_error.lock() = Some(error);
    }

    /// Makes the next `fetch_snapshot` call fail with `error`.
    pub fn fail_fetch(&self, error: SyncError) {
        *self.fetch_error.lock() = Some(error);
    }

    /// Makes the next `push_changes` call fail with `error`.
    pub fn fail_push(&self, error: SyncError) {
        *self.push_error.lock() = Some(error);
    }

    /// Returns every changeset pushed so far.
    pub fn pushed(&self) -> Vec<Changeset> {
        self.pushed.lock().clone()
    }

    /// Returns how many times `lock` was called.
    pub fn lock_calls(&self) -> usize {
        self.lock_calls.load(Ordering::SeqCst)
    }

    /// Returns how many times `unlock` was called.
    pub fn unlock_calls(&self) -> usize {
        self.unlock_calls.load(Ordering::SeqCst)
    }

    /// Returns how many times `fetch_snapshot` was called.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl SyncTransport for MockTransport {
    fn lock(&self) -> SyncResult<()> {
        self.lock_calls.fetch_add(1, Ordering::SeqCst);
        match self.lock_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn unlock(&self) -> SyncResult<()> {
        self.unlock_calls.fetch_add(1, Ordering::SeqCst);
        match self.unlock_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fetch_snapshot(&self) -> SyncResult<Snapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.fetch_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(self.snapshot.lock().clone()),
        }
    }

    fn push_changes(&self, changes: &Changeset) -> SyncResult<()> {
        match self.push_error.lock().take() {
            Some(error) => Err(error),
            None => {
                self.pushed.lock().push(changes.clone());
                Ok(())
            }
        }
    }
}
