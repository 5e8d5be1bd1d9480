//! Shared application state.

use std::sync::Arc;

use ridematch_auth::{JwtCodec, MemoryTokenStore, PasswordHasher, RefreshTokenStore};
use ridematch_core::Settings;
use ridematch_storage::{MemoryUserStore, UserStore};

use crate::Result;
use crate::accounts::Accounts;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Resolved settings.
    pub settings: Arc<Settings>,
    /// Account operations.
    pub accounts: Accounts,
}

impl AppState {
    /// Build state over the given stores. Fails if the JWT settings are
    /// unusable.
    pub fn new(
        settings: Settings,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
    ) -> Result<Self> {
        let jwt = Arc::new(JwtCodec::from_settings(&settings)?);
        let hasher = PasswordHasher::new(settings.bcrypt_rounds);
        Ok(Self {
            settings: Arc::new(settings),
            accounts: Accounts::new(users, tokens, jwt, hasher),
        })
    }

    /// State over fresh in-memory stores.
    pub fn in_memory(settings: Settings) -> Result<Self> {
        Self::new(
            settings,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryTokenStore::new()),
        )
    }
}
