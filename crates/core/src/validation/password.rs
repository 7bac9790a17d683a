//! Password policy.
//!
//! A single policy is enforced everywhere a password is chosen:
//! at least [`MIN_PASSWORD_LENGTH`] characters with at least one uppercase
//! letter, one lowercase letter and one digit.

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Reasons a password fails the policy.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    /// The password is empty.
    #[error("password is required")]
    Empty,
    /// Shorter than the minimum length.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// No uppercase ASCII letter.
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    /// No lowercase ASCII letter.
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    /// No ASCII digit.
    #[error("password must contain a digit")]
    MissingDigit,
    /// Confirmation does not match.
    #[error("passwords do not match")]
    Mismatch,
}

/// Check a password against the policy.
///
/// # Errors
///
/// Returns the first rule the password breaks.
///
/// # Examples
///
/// ```
/// use open_market_core::validation::{PasswordError, validate_password};
///
/// assert!(validate_password("Abc12345").is_ok());
/// assert_eq!(validate_password("abc12345"), Err(PasswordError::MissingUppercase));
/// ```
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    Ok(())
}

/// Check that the confirmation repeats a non-empty password.
///
/// # Errors
///
/// Returns `Mismatch` when the values differ or the password is empty.
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), PasswordError> {
    if password.is_empty() || password != confirm {
        return Err(PasswordError::Mismatch);
    }
    Ok(())
}
