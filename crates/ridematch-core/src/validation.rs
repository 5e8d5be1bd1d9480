//! Field validators and the [`Validate`] trait.
//!
//! Validation both checks and normalizes: names are trimmed and genders are
//! lower-cased, so [`Validate::validate`] consumes the value and hands back
//! the normalized one. Every failing field is reported, not just the first.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::dates::{self, ADULT_AGE};
use crate::user::Preferences;

/// Oldest plausible age for a date of birth.
pub const MAX_AGE: i32 = 100;

/// Accepted gender values.
pub const GENDERS: [&str; 4] = ["male", "female", "other", "prefer_not_to_say"];

/// A single field failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted field path (e.g. `preferences`).
    pub field: String,
    /// Human-readable failure.
    pub message: String,
}

/// All field failures for one request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// An empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// An error set holding one failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record a failure.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// True when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded failures, in the order they were found.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(value)` if nothing failed, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Check and normalize a request payload.
pub trait Validate: Sized {
    /// Validate `self`, returning the normalized value or every failure.
    fn validate(self) -> Result<Self, ValidationErrors>;
}

/// Collects failures while normalizing fields in place.
///
/// Each check returns the normalized value on success, or `None` after
/// recording the failure.
pub(crate) struct Checker {
    errors: ValidationErrors,
}

impl Checker {
    pub(crate) fn new() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }

    pub(crate) fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.push(field, message);
                None
            }
        }
    }

    pub(crate) fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        self.errors.into_result(value)
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Enforce a character-count range.
pub fn check_length(value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = char_len(value);
    if len < min {
        let noun = if min == 1 { "character" } else { "characters" };
        return Err(format!("String should have at least {min} {noun}"));
    }
    if len > max {
        return Err(format!("String should have at most {max} characters"));
    }
    Ok(())
}

/// Syntactic email check: one `@`, non-empty local part, dotted domain with
/// non-empty labels, no whitespace.
pub fn validate_email(email: &str) -> Result<(), String> {
    const INVALID: &str = "value is not a valid email address";

    if email.chars().any(char::is_whitespace) {
        return Err(INVALID.to_string());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(INVALID.to_string());
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(INVALID.to_string());
    }
    if domain.split('.').any(str::is_empty) {
        return Err(INVALID.to_string());
    }
    Ok(())
}

/// Length-check the raw name, then trim it; whitespace-only names fail.
pub fn validate_name(name: &str) -> Result<String, String> {
    check_length(name, 2, 100)?;
    let stripped = name.trim();
    if stripped.is_empty() {
        return Err("Name cannot be empty or only whitespace".to_string());
    }
    Ok(stripped.to_string())
}

/// 8-128 characters with at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), String> {
    check_length(password, 8, 128)?;
    if !password.chars().any(char::is_alphabetic) {
        return Err("Password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number".to_string());
    }
    Ok(())
}

/// At most 20 characters.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    check_length(phone, 0, 20)
}

/// Case-insensitive membership in [`GENDERS`]; returns the lower-cased value.
pub fn validate_gender(gender: &str) -> Result<String, String> {
    let lowered = gender.to_lowercase();
    if GENDERS.contains(&lowered.as_str()) {
        Ok(lowered)
    } else {
        Err(format!("Gender must be one of: {}", GENDERS.join(", ")))
    }
}

/// Not in the future, at least 18, at most 100 years ago.
pub fn validate_date_of_birth(date_of_birth: NaiveDate, today: NaiveDate) -> Result<(), String> {
    if date_of_birth > today {
        return Err("Date of birth cannot be in the future".to_string());
    }
    let age = dates::calculate_age(date_of_birth, today);
    if age < ADULT_AGE {
        return Err("Users must be at least 18 years old".to_string());
    }
    if age > MAX_AGE {
        return Err("Invalid date of birth".to_string());
    }
    Ok(())
}

/// Validate the structure and values of a preferences object.
pub fn validate_preferences(preferences: &Preferences) -> Result<(), String> {
    if let Some(mode) = preferences.get("default_mode") {
        if !matches!(mode.as_str(), Some("driver" | "passenger")) {
            return Err("default_mode must be 'driver' or 'passenger'".to_string());
        }
    }

    for field in ["smoking", "pets"] {
        if let Some(value) = preferences.get(field) {
            if !value.is_boolean() {
                return Err(format!("{field} must be a boolean"));
            }
        }
    }

    if let Some(notifications) = preferences.get("notifications") {
        let Value::Object(notifications) = notifications else {
            return Err("notifications must be an object".to_string());
        };
        for field in ["email", "push", "websocket"] {
            if let Some(value) = notifications.get(field) {
                if !value.is_boolean() {
                    return Err(format!("notifications.{field} must be a boolean"));
                }
            }
        }
    }

    if let Some(language) = preferences.get("language") {
        if !matches!(language.as_str(), Some("en" | "he")) {
            return Err("language must be 'en' or 'he'".to_string());
        }
    }

    if let Some(theme) = preferences.get("theme") {
        if !matches!(theme.as_str(), Some("light" | "dark")) {
            return Err("theme must be 'light' or 'dark'".to_string());
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    fn prefs(value: Value) -> Preferences {
        value.as_object().cloned().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.push("email", "bad");
        errors.push("name", "short");
        assert_eq!(errors.to_string(), "email: bad; name: short");
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(5), Ok(5));
        assert!(ValidationErrors::single("x", "y").into_result(5).is_err());
    }

    #[test]
    fn test_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co.il").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        for email in [
            "",
            "plainaddress",
            "@example.com",
            "user@",
            "user@localhost",
            "user@@example.com",
            "user@example..com",
            "user name@example.com",
        ] {
            assert!(validate_email(email).is_err(), "accepted {email:?}");
        }
    }

    #[test]
    fn test_name_trimmed() {
        assert_eq!(validate_name("  John Doe  ").unwrap(), "John Doe");
    }

    #[test]
    fn test_name_whitespace_only() {
        let err = validate_name("     ").unwrap_err();
        assert_eq!(err, "Name cannot be empty or only whitespace");
    }

    #[test]
    fn test_name_length_bounds() {
        assert!(validate_name("J").is_err());
        assert!(validate_name(&"a".repeat(100)).is_ok());
        assert!(validate_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_name_counts_characters_not_bytes() {
        assert!(validate_name("דן").is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("SecureP4ss").is_ok());
        assert_eq!(
            validate_password("short1").unwrap_err(),
            "String should have at least 8 characters"
        );
        assert_eq!(
            validate_password("12345678").unwrap_err(),
            "Password must contain at least one letter"
        );
        assert_eq!(
            validate_password("abcdefgh").unwrap_err(),
            "Password must contain at least one number"
        );
        assert!(validate_password(&format!("a1{}", "x".repeat(127))).is_err());
    }

    #[test]
    fn test_password_numeric_symbols_are_not_digits() {
        for password in ["Password½", "PasswordⅫ"] {
            assert_eq!(
                validate_password(password).unwrap_err(),
                "Password must contain at least one number"
            );
        }
    }

    #[test]
    fn test_phone_length() {
        assert!(validate_phone("+972-52-1234567").is_ok());
        assert!(validate_phone(&"1".repeat(21)).is_err());
    }

    #[test]
    fn test_gender_normalized() {
        assert_eq!(validate_gender("Female").unwrap(), "female");
        assert_eq!(
            validate_gender("PREFER_NOT_TO_SAY").unwrap(),
            "prefer_not_to_say"
        );
        assert!(validate_gender("unknown").is_err());
    }

    #[test]
    fn test_dob_future() {
        let today = date(2025, 6, 1);
        assert_eq!(
            validate_date_of_birth(date(2025, 6, 2), today).unwrap_err(),
            "Date of birth cannot be in the future"
        );
    }

    #[test]
    fn test_dob_minor() {
        let today = date(2025, 6, 1);
        assert_eq!(
            validate_date_of_birth(date(2007, 6, 2), today).unwrap_err(),
            "Users must be at least 18 years old"
        );
        assert!(validate_date_of_birth(date(2007, 6, 1), today).is_ok());
    }

    #[test]
    fn test_dob_too_old() {
        let today = date(2025, 6, 1);
        assert_eq!(
            validate_date_of_birth(date(1920, 1, 1), today).unwrap_err(),
            "Invalid date of birth"
        );
        assert!(validate_date_of_birth(date(today.year() - 100, 6, 1), today).is_ok());
    }

    #[test]
    fn test_preferences_valid() {
        let value = prefs(json!({
            "default_mode": "driver",
            "smoking": false,
            "pets": true,
            "notifications": {"email": true, "push": false, "websocket": true},
            "language": "he",
            "theme": "dark",
            "extra": "ignored"
        }));
        assert!(validate_preferences(&value).is_ok());
    }

    #[test]
    fn test_preferences_invalid_values() {
        let cases = [
            (json!({"default_mode": "pilot"}), "default_mode must be 'driver' or 'passenger'"),
            (json!({"smoking": "no"}), "smoking must be a boolean"),
            (json!({"pets": 1}), "pets must be a boolean"),
            (json!({"notifications": true}), "notifications must be an object"),
            (
                json!({"notifications": {"push": "yes"}}),
                "notifications.push must be a boolean",
            ),
            (json!({"language": "fr"}), "language must be 'en' or 'he'"),
            (json!({"theme": "blue"}), "theme must be 'light' or 'dark'"),
        ];
        for (value, expected) in cases {
            assert_eq!(validate_preferences(&prefs(value)).unwrap_err(), expected);
        }
    }
}
