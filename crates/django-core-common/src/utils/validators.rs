//! Value validators.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ValidationError;

/// Minimum length enforced by [`validate_password_strength`].
pub const MIN_PASSWORD_LENGTH: usize = 7;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$",
        )
        .unwrap()
    })
}

/// Returns `true` when `value` looks like an email address.
///
/// ```
/// use django_core_common::utils::validators::is_valid_email;
///
/// assert!(is_valid_email("abc@example.com"));
/// assert!(!is_valid_email("helloworld"));
/// ```
pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && email_regex().is_match(value)
}

/// Requires at least seven characters including one digit and one letter.
pub fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new(
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long."),
            "password_too_short",
        )
        .with_param("min_length", MIN_PASSWORD_LENGTH));
    }
    if !value.chars().any(char::is_numeric) {
        return Err(ValidationError::new(
            "Password must contain at least 1 digit.",
            "password_no_digit",
        ));
    }
    if !value.chars().any(char::is_alphabetic) {
        return Err(ValidationError::new(
            "Password must contain at least 1 letter.",
            "password_no_letter",
        ));
    }
    Ok(())
}
