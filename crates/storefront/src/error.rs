//! Unified error handling with Sentry integration.
//!
//! Every failure falls into one of the categories in [`ErrorKind`]. Internal
//! and network errors are reported to Sentry and shown to the user as a
//! generic message; the rest carry their own wording.

use open_market_core::LoginFormError;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::pages::{CartError, SignupError};
use crate::session::StoreError;

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never got an answer.
    Network,
    /// The user must log in (again).
    Authorization,
    /// Input rejected locally or by the server.
    Validation,
    /// The addressed resource does not exist.
    NotFound,
    /// Anything else.
    Internal,
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session store failed.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// Cart action refused or failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Login form incomplete.
    #[error("Login form error: {0}")]
    LoginForm(#[from] LoginFormError),

    /// Signup refused or failed.
    #[error("Signup error: {0}")]
    Signup(#[from] SignupError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Api(err) => err.kind(),
            Self::Cart(err) => err.kind(),
            Self::Signup(err) => err.kind(),
            Self::LoginForm(_) => ErrorKind::Validation,
            Self::Store(_) | Self::Config(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        // Don't expose internal error details to users
        match self.kind() {
            ErrorKind::Network => {
                "Could not reach the store. Please try again in a moment.".to_string()
            }
            ErrorKind::Internal => "Something went wrong. Please try again.".to_string(),
            ErrorKind::Authorization => match self {
                Self::Api(ApiError::InvalidCredentials) => {
                    "Username or password does not match.".to_string()
                }
                _ => "Please log in to continue.".to_string(),
            },
            ErrorKind::NotFound => "The requested item could not be found.".to_string(),
            ErrorKind::Validation => match self {
                Self::Cart(err) => err.to_string(),
                Self::LoginForm(err) => err.to_string(),
                Self::Signup(SignupError::Invalid(errors))
                | Self::Api(ApiError::FieldErrors(errors))
                | Self::Signup(SignupError::Api(ApiError::FieldErrors(errors))) => {
                    errors.to_string()
                }
                _ => self.to_string(),
            },
        }
    }

    /// Capture internal and network errors to Sentry and log them.
    pub fn report(&self) {
        if matches!(self.kind(), ErrorKind::Internal | ErrorKind::Network) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after login.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
