//! Age arithmetic.

use chrono::{Datelike, NaiveDate, Utc};

/// Minimum age to hold an account.
pub const ADULT_AGE: i32 = 18;

/// Today's date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whole years between `date_of_birth` and `today`.
///
/// ```
/// use chrono::NaiveDate;
/// use ridematch_core::dates::calculate_age;
///
/// let dob = NaiveDate::from_ymd_opt(1990, 5, 15).unwrap();
/// assert_eq!(calculate_age(dob, NaiveDate::from_ymd_opt(2025, 5, 14).unwrap()), 34);
/// assert_eq!(calculate_age(dob, NaiveDate::from_ymd_opt(2025, 5, 15).unwrap()), 35);
/// ```
pub fn calculate_age(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday =
        (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day());
    today.year() - date_of_birth.year() - i32::from(before_birthday)
}

/// Age as of today (UTC).
pub fn age_today(date_of_birth: NaiveDate) -> i32 {
    calculate_age(date_of_birth, today_utc())
}

/// Whether someone born on `date_of_birth` is at least `min_age` today.
pub fn is_adult(date_of_birth: NaiveDate, min_age: i32) -> bool {
    age_today(date_of_birth) >= min_age
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on_birthday() {
        assert_eq!(calculate_age(date(2000, 3, 1), date(2018, 3, 1)), 18);
    }

    #[test]
    fn test_age_day_before_birthday() {
        assert_eq!(calculate_age(date(2000, 3, 1), date(2018, 2, 28)), 17);
    }

    #[test]
    fn test_age_leap_day_birthday() {
        // Feb 29 birthdays roll over on Mar 1 in common years
        assert_eq!(calculate_age(date(2004, 2, 29), date(2022, 2, 28)), 17);
        assert_eq!(calculate_age(date(2004, 2, 29), date(2022, 3, 1)), 18);
    }

    #[test]
    fn test_age_future_date_is_negative() {
        assert_eq!(calculate_age(date(2030, 1, 1), date(2025, 6, 1)), -5);
    }

    #[test]
    fn test_is_adult() {
        let today = today_utc();
        let thirty = date(today.year() - 30, 1, 1);
        let ten = date(today.year() - 10, 1, 1);
        assert!(is_adult(thirty, ADULT_AGE));
        assert!(!is_adult(ten, ADULT_AGE));
    }
}
