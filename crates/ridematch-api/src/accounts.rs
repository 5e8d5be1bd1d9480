//! Account operations behind the HTTP handlers.
//!
//! Registration, login, token refresh and revocation, and profile access.
//! Handlers stay thin; every rule about who may do what lives here.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use ridematch_auth::{JwtCodec, PasswordHasher, RefreshTokenStore};
use ridematch_core::schemas::{
    AuthResponse, LoginRequest, MessageResponse, Token, UserCreate, UserPublic, UserUpdate,
};
use ridematch_core::User;
use ridematch_storage::UserStore;

use crate::error::ApiError;

const INVALID_LOGIN: &str = "Invalid email or password";
const DEACTIVATED: &str = "Account is deactivated";

/// Body of `POST /logout/all`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedResponse {
    /// Human-readable summary.
    pub message: String,
    /// Number of refresh tokens revoked.
    pub revoked: u64,
}

/// Reachability of the service's backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DependencyCheck {
    /// The user store answered a ping.
    pub database: bool,
    /// The refresh-token store answered a ping.
    pub redis: bool,
}

/// Account service over a user store and a refresh-token store.
#[derive(Clone)]
pub struct Accounts {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    jwt: Arc<JwtCodec>,
    hasher: PasswordHasher,
}

impl Accounts {
    /// Assemble the service.
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        jwt: Arc<JwtCodec>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            tokens,
            jwt,
            hasher,
        }
    }

    /// The token codec, shared with the auth middleware.
    pub fn jwt(&self) -> Arc<JwtCodec> {
        self.jwt.clone()
    }

    /// Create an account and sign the new user in.
    pub async fn register(&self, request: UserCreate) -> Result<AuthResponse, ApiError> {
        if self.users.email_exists(&request.email).await? {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let user = self
            .users
            .insert(request.into_new_user(password_hash))
            .await?;
        log::info!("Registered user {}", user.id);

        let (access, refresh) = self.issue_tokens(&user).await?;
        Ok(AuthResponse::new(
            &user,
            access,
            refresh,
            self.jwt.access_expires_in(),
        ))
    }

    /// Check credentials and record the login.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::unauthorized(INVALID_LOGIN))?;

        if !self.hasher.verify(password, &user.password_hash).await {
            return Err(ApiError::unauthorized(INVALID_LOGIN));
        }
        if !user.is_active {
            return Err(ApiError::unauthorized(DEACTIVATED));
        }

        let user = self.users.touch_last_login(user.id, Utc::now()).await?;
        log::debug!("User {} logged in", user.id);
        Ok(user)
    }

    /// JSON login: user plus a fresh token pair.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        let user = self.authenticate(&request.email, &request.password).await?;
        let (access, refresh) = self.issue_tokens(&user).await?;
        Ok(AuthResponse::new(
            &user,
            access,
            refresh,
            self.jwt.access_expires_in(),
        ))
    }

    /// OAuth2 password-form login: tokens only.
    pub async fn login_form(&self, email: &str, password: &str) -> Result<Token, ApiError> {
        let user = self.authenticate(email, password).await?;
        let (access, refresh) = self.issue_tokens(&user).await?;
        Ok(Token::bearer(
            access,
            Some(refresh),
            self.jwt.access_expires_in(),
        ))
    }

    /// Exchange a refresh token for a new access token. The refresh token
    /// stays valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, ApiError> {
        let user_id = self
            .jwt
            .decode_refresh_token(refresh_token)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

        let stored = match self.tokens.is_valid(refresh_token).await {
            Ok(stored) => stored,
            Err(e) => {
                log::error!("Refresh token lookup failed: {e}");
                false
            }
        };
        if !stored {
            return Err(ApiError::unauthorized("Refresh token has been revoked"));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;
        if !user.is_active {
            return Err(ApiError::forbidden(DEACTIVATED));
        }

        let access = self
            .jwt
            .create_access_token(user.id, &user.email, user.is_admin)?;
        Ok(Token::bearer(access, None, self.jwt.access_expires_in()))
    }

    /// Revoke one of the caller's refresh tokens. A store failure is logged
    /// and the logout still succeeds.
    pub async fn logout(
        &self,
        current: &User,
        refresh_token: &str,
    ) -> Result<MessageResponse, ApiError> {
        match self.jwt.decode_refresh_token(refresh_token) {
            Some(owner) if owner == current.id => {}
            _ => return Err(ApiError::BadRequest("Invalid refresh token".to_string())),
        }

        if let Err(e) = self.tokens.revoke(refresh_token).await {
            log::warn!("Could not revoke refresh token for user {}: {e}", current.id);
        }
        log::debug!("User {} logged out", current.id);
        Ok(MessageResponse::new("Successfully logged out"))
    }

    /// Revoke every refresh token the caller holds. A store failure is
    /// logged and reported as zero revocations.
    pub async fn logout_all(&self, current: &User) -> Result<RevokedResponse, ApiError> {
        let revoked = match self.tokens.revoke_all_for_user(current.id).await {
            Ok(revoked) => revoked,
            Err(e) => {
                log::warn!("Could not revoke refresh tokens for user {}: {e}", current.id);
                0
            }
        };
        Ok(RevokedResponse {
            message: "Logged out from all sessions".to_string(),
            revoked,
        })
    }

    /// Apply a validated profile update.
    pub async fn update_profile(&self, current: &User, update: UserUpdate) -> Result<User, ApiError> {
        let changes = update.into_changes();
        if changes.is_empty() {
            return Ok(current.clone());
        }
        Ok(self.users.update_profile(current.id, changes).await?)
    }

    /// Another user's public profile.
    pub async fn get_public_profile(&self, user_id: i64) -> Result<UserPublic, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| UserPublic::from(&user))
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Load a user by id, for request authentication.
    pub async fn find_user(&self, user_id: i64) -> Result<Option<User>, ApiError> {
        Ok(self.users.find_by_id(user_id).await?)
    }

    /// Ping both backends.
    pub async fn check_dependencies(&self) -> DependencyCheck {
        let (database, redis) = tokio::join!(self.users.ping(), self.tokens.ping());
        if let Err(e) = &database {
            log::warn!("Database health check failed: {e}");
        }
        if let Err(e) = &redis {
            log::warn!("Redis health check failed: {e}");
        }
        DependencyCheck {
            database: database.is_ok(),
            redis: redis.is_ok(),
        }
    }

    /// Issue an access/refresh pair and record the refresh token. A store
    /// failure is logged and the tokens are still returned.
    async fn issue_tokens(&self, user: &User) -> Result<(String, String), ApiError> {
        let access = self
            .jwt
            .create_access_token(user.id, &user.email, user.is_admin)?;
        let refresh = self.jwt.create_refresh_token(user.id)?;

        let ttl = self.jwt.refresh_ttl().to_std().unwrap_or_default();
        if let Err(e) = self.tokens.store(&refresh, user.id, ttl).await {
            log::warn!("Could not store refresh token for user {}: {e}", user.id);
        }

        Ok((access, refresh))
    }
}
