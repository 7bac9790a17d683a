//! Open Market Core - Shared types library.
//!
//! This crate provides common types used across all Open Market components:
//! - `storefront` - API client, session store and page state
//! - `cli` - Command-line front end for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, won prices, credentials
//!   and catalog snapshots
//! - [`validation`] - Login and signup form rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::*;
