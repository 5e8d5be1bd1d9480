//! API request/response contracts.
//!
//! Request types implement [`Validate`]; response types are built from a
//! [`User`] and never carry the password hash.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::user::{NewUser, Preferences, ProfileChanges, User};
use crate::validation::{
    Checker, Validate, ValidationErrors, check_length, validate_date_of_birth, validate_email,
    validate_gender, validate_name, validate_password, validate_phone, validate_preferences,
};

/// The only token type handed out.
pub const BEARER: &str = "bearer";

fn bearer() -> String {
    BEARER.to_string()
}

/// Lower-case the domain part of an address; the local part is kept as sent.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Registration request.
#[derive(Clone, Debug, Deserialize)]
pub struct UserCreate {
    /// Login email (must be unique).
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional date of birth (must be 18+).
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Optional gender.
    #[serde(default)]
    pub gender: Option<String>,
}

impl UserCreate {
    /// Turn a validated request into an insertable user.
    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            email: self.email,
            password_hash,
            name: self.name,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
        }
    }
}

impl Validate for UserCreate {
    fn validate(mut self) -> Result<Self, ValidationErrors> {
        let mut checker = Checker::new();
        let today = dates::today_utc();

        if checker.check("email", validate_email(&self.email)).is_some() {
            self.email = normalize_email(&self.email);
        }
        if let Some(name) = checker.check("name", validate_name(&self.name)) {
            self.name = name;
        }
        checker.check("password", validate_password(&self.password));
        if let Some(phone) = &self.phone {
            checker.check("phone", validate_phone(phone));
        }
        self.gender = normalize_gender(&mut checker, self.gender.take());
        if let Some(dob) = self.date_of_birth {
            checker.check("date_of_birth", validate_date_of_birth(dob, today));
        }

        checker.finish(self)
    }
}

/// Profile update request; every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// New date of birth.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// New gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Replacement preferences.
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

impl UserUpdate {
    /// Keep only the fields that were provided.
    pub fn into_changes(self) -> ProfileChanges {
        ProfileChanges {
            name: self.name,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            preferences: self.preferences,
        }
    }
}

impl Validate for UserUpdate {
    fn validate(mut self) -> Result<Self, ValidationErrors> {
        let mut checker = Checker::new();

        if let Some(name) = self.name.take() {
            self.name = checker.check("name", validate_name(&name));
        }
        if let Some(phone) = &self.phone {
            checker.check("phone", validate_phone(phone));
        }
        self.gender = normalize_gender(&mut checker, self.gender.take());
        if let Some(dob) = self.date_of_birth {
            checker.check("date_of_birth", validate_date_of_birth(dob, dates::today_utc()));
        }
        if let Some(preferences) = &self.preferences {
            checker.check("preferences", validate_preferences(preferences));
        }

        checker.finish(self)
    }
}

/// Empty strings mean "not provided"; anything else must be a known gender.
fn normalize_gender(checker: &mut Checker, gender: Option<String>) -> Option<String> {
    match gender {
        Some(gender) if !gender.is_empty() => checker.check("gender", validate_gender(&gender)),
        _ => None,
    }
}

/// Email/password login request.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(mut self) -> Result<Self, ValidationErrors> {
        let mut checker = Checker::new();
        if checker.check("email", validate_email(&self.email)).is_some() {
            self.email = normalize_email(&self.email);
        }
        checker.check("password", check_length(&self.password, 1, usize::MAX));
        checker.finish(self)
    }
}

/// OAuth2 password-flow form (`application/x-www-form-urlencoded`).
#[derive(Clone, Debug, Deserialize)]
pub struct LoginForm {
    /// The user's email.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl Validate for LoginForm {
    fn validate(self) -> Result<Self, ValidationErrors> {
        let mut checker = Checker::new();
        checker.check("username", check_length(&self.username, 1, usize::MAX));
        checker.check("password", check_length(&self.password, 1, usize::MAX));
        checker.finish(self)
    }
}

/// Refresh-token request body (refresh and logout).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenRefresh {
    /// The refresh token.
    pub refresh_token: String,
}

impl Validate for TokenRefresh {
    fn validate(self) -> Result<Self, ValidationErrors> {
        let mut checker = Checker::new();
        checker.check("refresh_token", check_length(&self.refresh_token, 1, usize::MAX));
        checker.finish(self)
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Full profile of the authenticated user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    /// User id.
    pub id: i64,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    pub gender: Option<String>,
    /// Admin flag.
    pub is_admin: bool,
    /// Active flag.
    pub is_active: bool,
    /// Email verification flag.
    pub is_email_verified: bool,
    /// Average rating as a driver.
    pub driver_rating: Option<f64>,
    /// Number of driver ratings.
    pub driver_rating_count: i32,
    /// Average rating as a passenger.
    pub passenger_rating: Option<f64>,
    /// Number of passenger ratings.
    pub passenger_rating_count: i32,
    /// Preferences object.
    pub preferences: Option<Preferences>,
    /// Account creation.
    pub created_at: DateTime<Utc>,
    /// Last profile change.
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            date_of_birth: user.date_of_birth,
            gender: user.gender.clone(),
            is_admin: user.is_admin,
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
            driver_rating: user.driver_rating,
            driver_rating_count: user.driver_rating_count,
            passenger_rating: user.passenger_rating,
            passenger_rating_count: user.passenger_rating_count,
            preferences: user.preferences.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Minimal profile visible to other users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserPublic {
    /// User id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Average rating as a driver.
    pub driver_rating: Option<f64>,
    /// Number of driver ratings.
    pub driver_rating_count: i32,
    /// Average rating as a passenger.
    pub passenger_rating: Option<f64>,
    /// Number of passenger ratings.
    pub passenger_rating_count: i32,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            driver_rating: user.driver_rating,
            driver_rating_count: user.driver_rating_count,
            passenger_rating: user.passenger_rating,
            passenger_rating_count: user.passenger_rating_count,
        }
    }
}

/// Token pair (or single access token on refresh).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// JWT access token.
    pub access_token: String,
    /// Always `"bearer"`.
    #[serde(default = "bearer")]
    pub token_type: String,
    /// JWT refresh token, absent on refresh.
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: Option<i64>,
}

impl Token {
    /// A bearer token response.
    pub fn bearer(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: bearer(),
            refresh_token,
            expires_in: Some(expires_in),
        }
    }
}

/// Identity decoded from an access token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenData {
    /// Subject user id.
    pub user_id: Option<i64>,
    /// Email claim.
    pub email: Option<String>,
    /// Admin claim.
    pub is_admin: bool,
    /// `access` or `refresh`.
    pub token_type: Option<String>,
}

/// User plus freshly issued tokens (register and login).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The user's full profile.
    pub user: UserResponse,
    /// JWT access token.
    pub access_token: String,
    /// JWT refresh token.
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl AuthResponse {
    /// Bundle a user with a token pair.
    pub fn new(user: &User, access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            token_type: bearer(),
            expires_in,
        }
    }
}

/// Plain message body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// The message.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
