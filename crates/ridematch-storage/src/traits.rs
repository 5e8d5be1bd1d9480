//! Storage abstraction traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ridematch_core::{NewUser, ProfileChanges, User};

use crate::Result;

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Whether any user has this email.
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Look a user up by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look a user up by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Create a user. Fails with [`Error::EmailTaken`](crate::Error::EmailTaken)
    /// when the email is in use.
    async fn insert(&self, user: NewUser) -> Result<User>;

    /// Apply profile changes and bump `updated_at`.
    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User>;

    /// Record a successful login.
    async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<User>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<()>;
}
