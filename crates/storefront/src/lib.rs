//! Open Market storefront client library.
//!
//! Talks to the Open Market REST API on behalf of a shopper: keeps the login
//! session, sends authenticated requests with a one-shot token refresh, and
//! models the cart, product detail, login/signup and header screens.
//!
//! # Modules
//!
//! - [`config`] - environment-driven settings
//! - [`session`] - credential storage over pluggable key-value stores
//! - [`api`] - typed API calls and the authenticated request gateway
//! - [`pages`] - page state driven by those calls
//! - [`error`] - the application error type and Sentry helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod pages;
pub mod session;

pub use api::{ApiError, OpenMarketClient};
pub use config::{ApiConfig, StorefrontConfig};
pub use error::{AppError, ErrorKind};
pub use session::Session;
