//! bcrypt password hashing.
//!
//! bcrypt only considers the first 72 bytes of a password; longer inputs are
//! truncated rather than rejected.

use crate::AuthError;

/// Hashes and verifies passwords with a fixed bcrypt cost.
///
/// Hashing is CPU-bound, so the async methods run it on the blocking pool.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    rounds: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            rounds: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Create a hasher with the given cost (4..=31).
    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    /// The configured bcrypt cost.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Hash a password.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let rounds = self.rounds;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_password(&password, rounds))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    /// Check a password against a stored hash. A malformed hash never matches.
    pub async fn verify(&self, password: &str, hash: &str) -> bool {
        let password = password.to_string();
        let hash = hash.to_string();
        match tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                log::error!("password verification task failed: {e}");
                false
            }
        }
    }
}

/// Hash a password synchronously.
pub fn hash_password(password: &str, rounds: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, rounds).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password synchronously.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matched) => matched,
        Err(e) => {
            log::debug!("stored password hash could not be checked: {e}");
            false
        }
    }
}
