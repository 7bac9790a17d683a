//! Login form checks performed before any request is sent.

use core::fmt;

/// Why a login form cannot be submitted yet.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFormError {
    /// Username is blank. `password_blank` records whether both fields
    /// should be flagged.
    #[error("please enter your username")]
    MissingUsername {
        /// The password field is blank as well.
        password_blank: bool,
    },
    /// Password is blank.
    #[error("please enter your password")]
    MissingPassword,
}

impl LoginFormError {
    /// Whether the username field should be flagged.
    #[must_use]
    pub const fn flags_username(&self) -> bool {
        matches!(self, Self::MissingUsername { .. })
    }

    /// Whether the password field should be flagged.
    #[must_use]
    pub const fn flags_password(&self) -> bool {
        matches!(
            self,
            Self::MissingPassword
                | Self::MissingUsername {
                    password_blank: true
                }
        )
    }
}

/// Trimmed login form input.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginForm {
    /// Build a form from raw input, trimming both fields.
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.trim().to_string(),
        }
    }

    /// Check that both fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns which field to flag and focus.
    pub fn validate(&self) -> Result<(), LoginFormError> {
        let username_blank = self.username.is_empty();
        let password_blank = self.password.is_empty();

        if username_blank {
            return Err(LoginFormError::MissingUsername { password_blank });
        }
        if password_blank {
            return Err(LoginFormError::MissingPassword);
        }
        Ok(())
    }

    /// Clear the password after a rejected attempt.
    pub fn reset_password(&mut self) {
        self.password.clear();
    }
}
