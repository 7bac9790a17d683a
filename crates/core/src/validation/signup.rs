//! Buyer signup form.
//!
//! Fields are filled in a fixed order. Focusing a field while an earlier one
//! is still blank reports the earlier one as required, and the submit action
//! stays disabled until every rule passes, the username availability check
//! has succeeded and the terms are accepted.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::password::{PasswordError, validate_password, validate_password_confirmation};

/// Maximum username length accepted by the API.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Mobile prefixes offered by the phone selector.
pub const PHONE_PREFIXES: &[&str] = &["010", "011", "016", "017", "018", "019"];

const DEFAULT_PHONE_PREFIX: &str = "010";

const REQUIRED: &str = "this field is required";

/// Signup form fields, in fill-in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignupField {
    Username,
    Password,
    PasswordConfirm,
    Name,
    PhoneMiddle,
    PhoneLast,
}

impl SignupField {
    /// All fields in fill-in order.
    pub const ORDER: [Self; 6] = [
        Self::Username,
        Self::Password,
        Self::PasswordConfirm,
        Self::Name,
        Self::PhoneMiddle,
        Self::PhoneLast,
    ];

    fn from_api_name(name: &str) -> Option<Self> {
        match name {
            "username" => Some(Self::Username),
            "password" => Some(Self::Password),
            "name" => Some(Self::Name),
            "phone_number" => Some(Self::PhoneMiddle),
            _ => None,
        }
    }
}

impl fmt::Display for SignupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::PasswordConfirm => "password confirmation",
            Self::Name => "name",
            Self::PhoneMiddle | Self::PhoneLast => "phone number",
        };
        f.write_str(label)
    }
}

/// Username rule violations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username is required")]
    Empty,
    #[error("username must be at most {max} characters")]
    TooLong { max: usize },
    #[error("username may only contain letters and digits")]
    InvalidCharacter,
}

/// Validate a username.
///
/// # Errors
///
/// Returns the first rule the username breaks.
pub fn validate_username(username: &str) -> Result<(), UsernameError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(UsernameError::Empty);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(UsernameError::TooLong {
            max: MAX_USERNAME_LENGTH,
        });
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(UsernameError::InvalidCharacter);
    }
    Ok(())
}

/// Validate a display name (required only).
///
/// # Errors
///
/// Returns an error message when the name is blank.
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err(REQUIRED);
    }
    Ok(())
}

/// Phone number rule violations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("unsupported phone prefix: {0}")]
    UnknownPrefix(String),
    #[error("the middle part must be 3 or 4 digits")]
    InvalidMiddle,
    #[error("the last part must be 4 digits")]
    InvalidLast,
}

/// Validate a three-part phone number and return it joined.
///
/// # Errors
///
/// Returns the first part that is malformed.
pub fn validate_phone(prefix: &str, middle: &str, last: &str) -> Result<String, PhoneError> {
    if !PHONE_PREFIXES.contains(&prefix) {
        return Err(PhoneError::UnknownPrefix(prefix.to_string()));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !(3..=4).contains(&middle.len()) || !all_digits(middle) {
        return Err(PhoneError::InvalidMiddle);
    }
    if last.len() != 4 || !all_digits(last) {
        return Err(PhoneError::InvalidLast);
    }
    Ok(format!("{prefix}{middle}{last}"))
}

/// Field-keyed signup errors, from local checks or from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupErrors {
    fields: BTreeMap<SignupField, String>,
    /// The username availability check has not passed.
    pub username_unchecked: bool,
    /// Terms of service not accepted.
    pub terms_not_accepted: bool,
}

impl SignupErrors {
    /// Record a message for a field, keeping the first one.
    pub fn insert(&mut self, field: SignupField, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Message for a field, if any.
    #[must_use]
    pub fn get(&self, field: SignupField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Iterate field messages in fill-in order.
    pub fn iter(&self) -> impl Iterator<Item = (SignupField, &str)> {
        self.fields.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Whether nothing blocks submission.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && !self.username_unchecked && !self.terms_not_accepted
    }

    /// Build from the signup endpoint's `{ field: [messages] }` payload.
    ///
    /// Unknown keys (e.g. `non_field_errors`) are attached to the username.
    #[must_use]
    pub fn from_api(payload: &BTreeMap<String, Vec<String>>) -> Self {
        let mut errors = Self::default();
        for (key, messages) in payload {
            let field = SignupField::from_api_name(key).unwrap_or(SignupField::Username);
            if let Some(first) = messages.first() {
                errors.insert(field, first.clone());
            }
        }
        errors
    }
}

impl fmt::Display for SignupErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.iter().map(|(f, m)| format!("{f}: {m}")).collect();
        if self.username_unchecked {
            parts.push("username availability has not been checked".to_string());
        }
        if self.terms_not_accepted {
            parts.push("terms of service must be accepted".to_string());
        }
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for SignupErrors {}

/// Body of `POST /accounts/buyer/signup/`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub phone_number: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Signup form state.
///
/// Implements `Debug` manually to redact both password fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    username: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
    pub phone_prefix: String,
    pub phone_middle: String,
    pub phone_last: String,
    username_checked: bool,
    pub terms_accepted: bool,
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("password_confirm", &"[REDACTED]")
            .field("name", &self.name)
            .field("phone_prefix", &self.phone_prefix)
            .field("phone_middle", &self.phone_middle)
            .field("phone_last", &self.phone_last)
            .field("username_checked", &self.username_checked)
            .field("terms_accepted", &self.terms_accepted)
            .finish()
    }
}

impl SignupForm {
    /// An empty form with the default `010` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phone_prefix: DEFAULT_PHONE_PREFIX.to_string(),
            ..Self::default()
        }
    }

    /// Current username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Change the username. Any previous availability check is discarded.
    pub fn set_username(&mut self, username: &str) {
        let username = username.trim();
        if username != self.username {
            self.username = username.to_string();
            self.username_checked = false;
        }
    }

    /// Record the outcome of the availability check for the current username.
    pub const fn mark_username_checked(&mut self, available: bool) {
        self.username_checked = available;
    }

    /// Whether the current username passed the availability check.
    #[must_use]
    pub const fn username_checked(&self) -> bool {
        self.username_checked
    }

    fn value(&self, field: SignupField) -> &str {
        match field {
            SignupField::Username => &self.username,
            SignupField::Password => &self.password,
            SignupField::PasswordConfirm => &self.password_confirm,
            SignupField::Name => &self.name,
            SignupField::PhoneMiddle => &self.phone_middle,
            SignupField::PhoneLast => &self.phone_last,
        }
    }

    /// First field before `field` that is still blank.
    ///
    /// Called when `field` gains focus; the returned field should be flagged
    /// as required and focused instead.
    #[must_use]
    pub fn first_missing_before(&self, field: SignupField) -> Option<SignupField> {
        SignupField::ORDER
            .iter()
            .copied()
            .take_while(|f| *f != field)
            .find(|f| self.value(*f).trim().is_empty())
    }

    /// Run every rule and collect the failures.
    #[must_use]
    pub fn errors(&self) -> SignupErrors {
        let mut errors = SignupErrors::default();

        if let Err(e) = validate_username(&self.username) {
            errors.insert(SignupField::Username, e.to_string());
        } else if !self.username_checked {
            errors.username_unchecked = true;
        }

        if let Err(e) = validate_password(&self.password) {
            let message = match e {
                PasswordError::Empty => REQUIRED.to_string(),
                _ => "use at least 8 characters with upper and lower case letters and a digit"
                    .to_string(),
            };
            errors.insert(SignupField::Password, message);
        }
        if let Err(e) = validate_password_confirmation(&self.password, &self.password_confirm) {
            errors.insert(SignupField::PasswordConfirm, e.to_string());
        }
        if let Err(message) = validate_name(&self.name) {
            errors.insert(SignupField::Name, message);
        }
        match validate_phone(&self.phone_prefix, &self.phone_middle, &self.phone_last) {
            Err(e @ PhoneError::InvalidLast) => errors.insert(SignupField::PhoneLast, e.to_string()),
            Err(e) => errors.insert(SignupField::PhoneMiddle, e.to_string()),
            Ok(_) => {}
        }

        errors.terms_not_accepted = !self.terms_accepted;
        errors
    }

    /// Whether the submit action should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.errors().is_empty()
    }

    /// Produce the request body if every rule passes.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors otherwise.
    pub fn to_request(&self) -> Result<SignupRequest, SignupErrors> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(errors);
        }
        let phone_number = validate_phone(&self.phone_prefix, &self.phone_middle, &self.phone_last)
            .map_err(|e| {
                let mut errors = SignupErrors::default();
                errors.insert(SignupField::PhoneMiddle, e.to_string());
                errors
            })?;
        Ok(SignupRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            name: self.name.trim().to_string(),
            phone_number,
        })
    }
}
