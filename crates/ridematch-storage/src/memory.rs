//! In-memory user store.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ridematch_core::{NewUser, Preferences, ProfileChanges, User};

use crate::{Error, Result, UserStore};

/// Users held in a vector; ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set a user's active flag. There is no API for this; tests use it to
    /// exercise deactivated accounts.
    pub fn set_active(&self, id: i64, active: bool) -> Result<()> {
        self.modify(id, |user| user.is_active = active).map(|_| ())
    }

    fn modify(&self, id: i64, f: impl FnOnce(&mut User)) -> Result<User> {
        let mut users = self.users.write().map_err(poisoned)?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(Error::NotFound(id))?;
        f(user);
        Ok(user.clone())
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::backend("user store lock poisoned")
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(Error::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: users.last().map_or(1, |u| u.id + 1),
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_admin: false,
            name: new_user.name,
            phone: new_user.phone,
            date_of_birth: new_user.date_of_birth,
            gender: new_user.gender,
            is_active: true,
            is_email_verified: false,
            email_verified_at: None,
            driver_rating: None,
            driver_rating_count: 0,
            passenger_rating: None,
            passenger_rating_count: 0,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            preferences: Some(Preferences::new()),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User> {
        self.modify(id, |user| {
            changes.apply_to(user);
            user.updated_at = Utc::now();
        })
    }

    async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<User> {
        self.modify(id, |user| user.last_login_at = Some(at))
    }

    async fn ping(&self) -> Result<()> {
        self.users.read().map(|_| ()).map_err(poisoned)
    }
}
