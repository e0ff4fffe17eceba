//! Session tokens for resuming room membership.
//!
//! A token is the only credential a client holds: presenting it on a new
//! connection rebinds the member it was issued to. Tokens are drawn from
//! the thread-local CSPRNG and carry roughly 256 bits of entropy.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Number of characters in a generated token.
pub const TOKEN_LENGTH: usize = 43;

/// Alphabet for generated tokens.
const TOKEN_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Opaque reconnection token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a new unpredictable token.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let token = (0..TOKEN_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..TOKEN_CHARS.len());
                TOKEN_CHARS[idx] as char
            })
            .collect();
        Self(token)
    }

    /// Get the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a token authorizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEntry {
    /// Username of the member the token was issued to.
    pub username: String,
    /// Room the member belongs to.
    pub room_name: String,
}

/// Maps session tokens to the membership they authorize.
pub struct SessionTokenStore {
    entries: RwLock<HashMap<SessionToken, TokenEntry>>,
}

impl SessionTokenStore {
    /// Create an empty token store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a fresh token.
    pub fn generate(&self) -> SessionToken {
        SessionToken::generate()
    }

    /// Record that `token` authorizes `username` in `room_name`.
    pub async fn put(
        &self,
        token: SessionToken,
        username: impl Into<String>,
        room_name: impl Into<String>,
    ) {
        let entry = TokenEntry {
            username: username.into(),
            room_name: room_name.into(),
        };
        self.entries.write().await.insert(token, entry);
    }

    /// Look up a token.
    pub async fn get(&self, token: &str) -> Option<TokenEntry> {
        self.entries.read().await.get(token).cloned()
    }

    /// Revoke a token.
    ///
    /// Returns the entry if the token was known.
    pub async fn revoke(&self, token: &str) -> Option<TokenEntry> {
        self.entries.write().await.remove(token)
    }

    /// Get the number of live tokens.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the store holds no tokens.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for SessionTokenStore {
    fn default() -> Self {
        Self::new()
    }
}
