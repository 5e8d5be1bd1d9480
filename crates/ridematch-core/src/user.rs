//! The `users` domain model.
//!
//! A user can act as both driver and passenger; the role is contextual and
//! never stored. Only admin status is persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{self, ADULT_AGE};

/// Free-form user preferences (default_mode, smoking, pets, notifications,
/// language, theme).
pub type Preferences = serde_json::Map<String, serde_json::Value>;

/// UI mode used when a user has not chosen one.
pub const DEFAULT_MODE: &str = "passenger";

/// A persisted user account.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    // Core identity
    /// Primary key.
    pub id: i64,
    /// Login email, unique.
    pub email: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Admin access flag.
    pub is_admin: bool,

    // Profile
    /// Display name.
    pub name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Date of birth, used for the 18+ check.
    pub date_of_birth: Option<NaiveDate>,
    /// One of male, female, other, prefer_not_to_say.
    pub gender: Option<String>,

    // Account status
    /// Deactivated accounts cannot log in.
    pub is_active: bool,
    /// Email verification status.
    pub is_email_verified: bool,
    /// When the email was verified.
    pub email_verified_at: Option<DateTime<Utc>>,

    // Cached ratings (synced from the feedback service)
    /// Average rating received as a driver (1.0-5.0).
    pub driver_rating: Option<f64>,
    /// Number of ratings received as a driver.
    pub driver_rating_count: i32,
    /// Average rating received as a passenger (1.0-5.0).
    pub passenger_rating: Option<f64>,
    /// Number of ratings received as a passenger.
    pub passenger_rating_count: i32,

    // Timestamps
    /// Account creation.
    pub created_at: DateTime<Utc>,
    /// Last profile change.
    pub updated_at: DateTime<Utc>,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,

    /// User preferences and settings.
    pub preferences: Option<Preferences>,
}

impl User {
    /// Current age in years, if a date of birth is known.
    pub fn age(&self) -> Option<i32> {
        self.date_of_birth.map(dates::age_today)
    }

    /// Whether the user is 18+, if their age is known.
    pub fn is_adult(&self) -> Option<bool> {
        self.age().map(|age| age >= ADULT_AGE)
    }

    /// Preferred UI mode: `"driver"` or `"passenger"`.
    pub fn default_mode(&self) -> &str {
        self.preferences
            .as_ref()
            .and_then(|prefs| prefs.get("default_mode"))
            .and_then(|mode| mode.as_str())
            .unwrap_or(DEFAULT_MODE)
    }

    /// Fold a newly submitted rating into the cached running average.
    pub fn update_rating(&mut self, role: RatingRole, new_rating: f64) {
        let (rating, count) = match role {
            RatingRole::Driver => (&mut self.driver_rating, &mut self.driver_rating_count),
            RatingRole::Passenger => (&mut self.passenger_rating, &mut self.passenger_rating_count),
        };

        match rating {
            None => {
                *rating = Some(new_rating);
                *count = 1;
            }
            Some(average) => {
                let total = *average * f64::from(*count) + new_rating;
                *count += 1;
                *average = total / f64::from(*count);
            }
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User(id={}, email='{}')", self.id, self.email)?;
        if self.is_admin {
            write!(f, " [ADMIN]")?;
        }
        if self.is_email_verified {
            write!(f, " [VERIFIED]")?;
        }
        write!(f, ">")
    }
}

/// Which side of a ride a rating applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingRole {
    /// Rated as the driver.
    Driver,
    /// Rated as the passenger.
    Passenger,
}

impl FromStr for RatingRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver" => Ok(Self::Driver),
            "passenger" => Ok(Self::Passenger),
            other => Err(format!("unknown rating role '{other}'")),
        }
    }
}

/// Fields required to create a user.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Normalized gender.
    pub gender: Option<String>,
}

/// A partial profile update. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileChanges {
    /// New display name.
    pub name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// New gender.
    pub gender: Option<String>,
    /// Replacement preferences object.
    pub preferences: Option<Preferences>,
}

impl ProfileChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
            && self.preferences.is_none()
    }

    /// Apply the changes to an in-memory user.
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(date_of_birth) = self.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }
        if let Some(gender) = self.gender {
            user.gender = Some(gender);
        }
        if let Some(preferences) = self.preferences {
            user.preferences = Some(preferences);
        }
    }
}
