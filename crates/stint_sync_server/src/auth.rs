//! API token authentication.
//!
//! Clients present an opaque token; the server stores only SHA-256
//! hashes of issued tokens, keyed to a client name and a permission
//! list. Leaking the tokens file therefore leaks no credentials.
//!
//! The tokens file is a JSON map from hash to entry:
//!
//! ```json
//! {
//!   "9f86d081...": { "Name": "laptop", "Permissions": ["database:sync"] }
//! }
//! ```

use crate::error::{ServerError, ServerResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Permission required for every sync endpoint.
pub const SYNC_PERMISSION: &str = "database:sync";

const TOKEN_BYTES: usize = 32;
const TOKEN_CHARS: usize = TOKEN_BYTES * 2;

/// An issued API token. Only ever shown once, at generation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Generates a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill(&mut bytes[..]);
        Self(hex_encode(&bytes))
    }

    /// Returns the token string presented by clients.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the hash stored in the tokens file.
    pub fn hash(&self) -> TokenHash {
        TokenHash::of(&self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 hash of a token string, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenHash(String);

impl TokenHash {
    /// Hashes a presented token string.
    pub fn of(token: &str) -> Self {
        Self(hex_encode(&Sha256::digest(token.as_bytes())))
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry in the tokens file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenInfo {
    /// Client name; doubles as the lock holder identity.
    pub name: String,
    /// Permissions granted to the token.
    pub permissions: Vec<String>,
}

impl TokenInfo {
    /// Creates an entry granting sync access to `name`.
    pub fn sync_client(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: vec![SYNC_PERMISSION.to_string()],
        }
    }

    /// Returns true if the entry grants `permission`.
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// The set of issued tokens, looked up by hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenRegistry {
    tokens: HashMap<String, TokenInfo>,
}

impl TokenRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the registry from a tokens file.
    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let contents = fs::read_to_string(path).map_err(|err| ServerError::TokenFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| ServerError::TokenFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Adds an entry for `hash`.
    pub fn insert(&mut self, hash: TokenHash, info: TokenInfo) {
        self.tokens.insert(hash.0, info);
    }

    /// Number of issued tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no tokens are issued.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Checks a presented token for `permission` and returns the
    /// client name it identifies.
    ///
    /// Absent or misshapen tokens are malformed (400); tokens that
    /// hash to no entry, or to an entry without the permission, are
    /// refused (403).
    pub fn authorize(&self, presented: &str, permission: &str) -> ServerResult<String> {
        if presented.len() != TOKEN_CHARS || !presented.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ServerError::MalformedToken);
        }
        let info = self
            .tokens
            .get(TokenHash::of(presented).as_str())
            .ok_or(ServerError::UnknownToken)?;
        if !info.grants(permission) {
            return Err(ServerError::PermissionDenied(permission.to_string()));
        }
        Ok(info.name.clone())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
