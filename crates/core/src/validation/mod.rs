//! Login and signup form rules.
//!
//! Every rule here is pure: it takes field values and returns a typed
//! `Result`. Validation failures never become transport errors; callers show
//! them inline and keep the submit action disabled.

pub mod login;
pub mod password;
pub mod signup;

pub use login::{LoginForm, LoginFormError};
pub use password::{PasswordError, validate_password, validate_password_confirmation};
pub use signup::{
    PHONE_PREFIXES, PhoneError, SignupErrors, SignupField, SignupForm, SignupRequest,
    UsernameError, validate_name, validate_phone, validate_username,
};
