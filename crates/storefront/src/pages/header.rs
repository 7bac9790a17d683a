//! Header login status.

use crate::session::Session;

/// The account link shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStatus {
    LoggedIn,
    LoggedOut,
}

impl NavStatus {
    /// Status for the current session.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        if session.is_logged_in() {
            Self::LoggedIn
        } else {
            Self::LoggedOut
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LoggedIn => "My page",
            Self::LoggedOut => "Login",
        }
    }

    #[must_use]
    pub const fn href(self) -> &'static str {
        match self {
            Self::LoggedIn => "/mypage",
            Self::LoggedOut => "/login",
        }
    }
}
