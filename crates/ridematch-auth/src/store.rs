//! Refresh-token revocation store.
//!
//! A refresh token is usable only while its fingerprint is present in the
//! store. Keys are `refresh_token:<sha256 hex of token>`, values are the
//! owning user id, and every entry expires with the token's lifetime.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::AuthError;

/// Key prefix for stored refresh tokens.
pub const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";

/// Store key for a refresh token.
pub fn token_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{REFRESH_TOKEN_PREFIX}{}", hex::encode(digest))
}

/// Backend that tracks which refresh tokens are still valid.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Record a refresh token for `user_id`, expiring after `ttl`.
    async fn store(&self, token: &str, user_id: i64, ttl: Duration) -> Result<(), AuthError>;

    /// Whether the token is present and unexpired.
    async fn is_valid(&self, token: &str) -> Result<bool, AuthError>;

    /// Remove a token. Returns whether it was present.
    async fn revoke(&self, token: &str) -> Result<bool, AuthError>;

    /// Remove every token belonging to `user_id`. Returns how many were removed.
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AuthError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), AuthError>;
}

#[derive(Debug)]
struct Entry {
    user_id: String,
    expires_at: Instant,
}

/// In-process token store, used for tests and `serve --memory`.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired tokens held.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    /// Whether the store holds no unexpired tokens.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> AuthError {
    AuthError::token_store("token store lock poisoned")
}

#[async_trait]
impl RefreshTokenStore for MemoryTokenStore {
    async fn store(&self, token: &str, user_id: i64, ttl: Duration) -> Result<(), AuthError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            token_key(token),
            Entry {
                user_id: user_id.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn is_valid(&self, token: &str) -> Result<bool, AuthError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(&token_key(token))
            .is_some_and(|e| e.expires_at > Instant::now()))
    }

    async fn revoke(&self, token: &str) -> Result<bool, AuthError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(entries
            .remove(&token_key(token))
            .is_some_and(|e| e.expires_at > Instant::now()))
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AuthError> {
        let owner = user_id.to_string();
        let now = Instant::now();
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        let mut expired = 0;
        entries.retain(|_, e| {
            if e.user_id != owner {
                return true;
            }
            if e.expires_at <= now {
                expired += 1;
            }
            false
        });
        Ok((before - entries.len() - expired) as u64)
    }

    async fn ping(&self) -> Result<(), AuthError> {
        self.entries.read().map(|_| ()).map_err(poisoned)
    }
}
