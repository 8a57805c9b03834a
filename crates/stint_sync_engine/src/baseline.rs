//! Baseline snapshot persistence.
//!
//! Each replica remembers the snapshot both sides agreed on at the end
//! of its last round. The file is plain JSON in the same wire shape as
//! the snapshot endpoint, so a baseline written by any stint client
//! reads back here.

use crate::error::{SyncError, SyncResult};
use std::fs;
use std::io;
use std::path::Path;
use stint_sync_protocol::Snapshot;
use tracing::debug;

/// Loads the baseline snapshot from `path`.
///
/// Returns `None` when the file does not exist yet, which a round
/// treats as a first sync.
pub fn load_baseline(path: &Path) -> SyncResult<Option<Snapshot>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no baseline file");
            return Ok(None);
        }
        Err(err) => {
            return Err(SyncError::baseline(format!(
                "read {}: {err}",
                path.display()
            )))
        }
    };
    let snapshot = serde_json::from_slice(&bytes)
        .map_err(|err| SyncError::baseline(format!("parse {}: {err}", path.display())))?;
    Ok(Some(snapshot))
}

/// Writes `snapshot` to `path`, replacing any previous baseline.
///
/// Writes a sibling temp file first and renames it into place, so a
/// crash mid-write leaves the old baseline readable.
pub fn store_baseline(path: &Path, snapshot: &Snapshot) -> SyncResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                SyncError::baseline(format!("create {}: {err}", parent.display()))
            })?;
        }
    }

    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|err| SyncError::baseline(format!("encode baseline: {err}")))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes)
        .map_err(|err| SyncError::baseline(format!("write {}: {err}", tmp.display())))?;
    fs::rename(&tmp, path).map_err(|err| {
        SyncError::baseline(format!(
            "rename {} to {}: {err}",
            tmp.display(),
            path.display()
        ))
    })?;
    debug!(path = %path.display(), records = snapshot.record_count(), "stored baseline");
    Ok(())
}
