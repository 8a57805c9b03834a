//! Constants and helpers shared by the wire-facing protocol types.

use serde::{Deserialize, Deserializer};

/// Request header carrying the client's API token.
pub const API_TOKEN_HEADER: &str = "X-API-Token";

/// Path of the lock endpoint (POST).
pub const LOCK_PATH: &str = "/lock";

/// Path of the unlock endpoint (POST).
pub const UNLOCK_PATH: &str = "/unlock";

/// Path of the snapshot endpoint (GET).
pub const SNAPSHOT_PATH: &str = "/database";

/// Path of the changeset endpoint (POST).
pub const CHANGES_PATH: &str = "/database/changes";

/// Deserializes a JSON array field that may be encoded as `null`.
///
/// Peer implementations built on Go's `encoding/json` emit `null` for
/// empty collections. Both `null` and `[]` decode to an empty `Vec`.
pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
