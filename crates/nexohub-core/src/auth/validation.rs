//! Client-side checks run on every edit of the login form.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::Credentials;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The email hint only appears once the user has typed past this many characters.
const EMAIL_HINT_AFTER_CHARS: usize = 3;

/// One `@`, at least one `.` after it, no whitespace anywhere.
/// Permissive; the server does the real check.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter a valid email address.")]
    InvalidEmail,

    #[error("Password must be at least 8 characters.")]
    PasswordTooShort,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Derived from the current credentials, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationState {
    pub email_valid: bool,
    pub password_valid: bool,
}

impl ValidationState {
    pub fn of(credentials: &Credentials) -> Self {
        Self {
            email_valid: is_valid_email(&credentials.email),
            password_valid: is_valid_password(&credentials.password),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.email_valid && self.password_valid
    }

    /// First failing rule, email before password.
    pub fn check(&self) -> Result<(), ValidationError> {
        if !self.email_valid {
            return Err(ValidationError::InvalidEmail);
        }
        if !self.password_valid {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(())
    }
}

/// Inline hint shown under the email field while typing.
pub fn email_hint(email: &str) -> Option<&'static str> {
    if !is_valid_email(email) && email.chars().count() > EMAIL_HINT_AFTER_CHARS {
        Some("Invalid email format.")
    } else {
        None
    }
}

/// Inline hint shown under the password field while typing.
pub fn password_hint(password: &str) -> Option<&'static str> {
    if !is_valid_password(password) && !password.is_empty() {
        Some("Minimum 8 characters.")
    } else {
        None
    }
}
