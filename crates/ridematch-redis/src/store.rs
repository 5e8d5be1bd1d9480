//! `RefreshTokenStore` over Redis.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use ridematch_auth::{AuthError, REFRESH_TOKEN_PREFIX, RefreshTokenStore, token_key};

use crate::{Error, Result};

/// Keys fetched per `SCAN` round when revoking a user's tokens.
pub const SCAN_BATCH: usize = 100;

/// Refresh tokens stored as `refresh_token:<sha256>` → user id, with `EX`
/// set to the token lifetime.
///
/// The connection is opened on first use. Until it succeeds every operation
/// fails with [`AuthError::TokenStore`], and the next operation retries.
pub struct RedisTokenStore {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
}

impl std::fmt::Debug for RedisTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTokenStore")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl RedisTokenStore {
    /// Store for the server at `url` (`redis://[:pass@]host:port/db`). Only
    /// the URL is checked here; no connection is made.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    /// Whether a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.conn.initialized()
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = ConnectionManager::new(self.client.clone()).await?;
                log::info!("Connected to redis");
                Ok::<_, Error>(conn)
            })
            .await?;
        Ok(conn.clone())
    }

    async fn scan_page(
        &self,
        conn: &mut ConnectionManager,
        cursor: u64,
    ) -> Result<(u64, Vec<String>)> {
        let page = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(format!("{REFRESH_TOKEN_PREFIX}*"))
            .arg("COUNT")
            .arg(SCAN_BATCH)
            .query_async::<(u64, Vec<String>)>(conn)
            .await?;
        Ok(page)
    }

    async fn revoke_all(&self, user_id: i64) -> Result<u64> {
        let owner = user_id.to_string();
        let mut conn = self.connection().await?;
        let mut cursor = 0u64;
        let mut revoked = 0u64;

        loop {
            let (next, keys) = self.scan_page(&mut conn, cursor).await?;
            for key in keys {
                let value: Option<String> = conn.get(key.as_str()).await?;
                if value.as_deref() == Some(owner.as_str()) {
                    let removed: u64 = conn.del(key.as_str()).await?;
                    revoked += removed;
                }
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(revoked)
    }
}

#[async_trait]
impl RefreshTokenStore for RedisTokenStore {
    async fn store(
        &self,
        token: &str,
        user_id: i64,
        ttl: Duration,
    ) -> std::result::Result<(), AuthError> {
        let mut conn = self.connection().await?;
        // EX must be at least one second
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(token_key(token), user_id.to_string(), seconds)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn is_valid(&self, token: &str) -> std::result::Result<bool, AuthError> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(token_key(token)).await.map_err(Error::from)?;
        Ok(exists)
    }

    async fn revoke(&self, token: &str) -> std::result::Result<bool, AuthError> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn.del(token_key(token)).await.map_err(Error::from)?;
        Ok(removed > 0)
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> std::result::Result<u64, AuthError> {
        let revoked = self.revoke_all(user_id).await?;
        log::info!("Revoked {revoked} refresh token(s) for user {user_id}");
        Ok(revoked)
    }

    async fn ping(&self) -> std::result::Result<(), AuthError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(Error::from)?;
        Ok(())
    }
}
