//! PostgreSQL user store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use ridematch_core::{NewUser, Preferences, ProfileChanges, Settings, User};

use crate::{Error, Result, UserStore};

const USER_COLUMNS: &str = "id, email, password_hash, is_admin, name, phone, date_of_birth, \
     gender, is_active, is_email_verified, email_verified_at, driver_rating, \
     driver_rating_count, passenger_rating, passenger_rating_count, created_at, \
     updated_at, last_login_at, preferences";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    is_admin: bool,
    name: String,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    is_active: bool,
    is_email_verified: bool,
    email_verified_at: Option<DateTime<Utc>>,
    driver_rating: Option<f64>,
    driver_rating_count: i32,
    passenger_rating: Option<f64>,
    passenger_rating_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
    preferences: Option<Json<Preferences>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
            name: row.name,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            is_active: row.is_active,
            is_email_verified: row.is_email_verified,
            email_verified_at: row.email_verified_at,
            driver_rating: row.driver_rating,
            driver_rating_count: row.driver_rating_count,
            passenger_rating: row.passenger_rating,
            passenger_rating_count: row.passenger_rating_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
            preferences: row.preferences.map(|Json(p)| p),
        }
    }
}

/// Users in the `users` table.
#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily-connecting pool from settings. No connection is made
    /// until the first query.
    pub fn connect_lazy(settings: &Settings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .connect_lazy(&settings.database_url())?;
        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn map_insert_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::EmailTaken,
        _ => Error::Database(err),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, name, phone, date_of_birth, gender, preferences) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(&user.phone)
            .bind(user.date_of_birth)
            .bind(&user.gender)
            .bind(Json(Preferences::new()))
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?;

        let user = User::from(row);
        log::info!("Created user {}", user.id);
        Ok(user)
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User> {
        let sql = format!(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 phone = COALESCE($3, phone), \
                 date_of_birth = COALESCE($4, date_of_birth), \
                 gender = COALESCE($5, gender), \
                 preferences = COALESCE($6, preferences), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.phone)
            .bind(changes.date_of_birth)
            .bind(changes.gender)
            .bind(changes.preferences.map(Json))
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or(Error::NotFound(id))
    }

    async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<User> {
        let sql = format!(
            "UPDATE users SET last_login_at = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or(Error::NotFound(id))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
