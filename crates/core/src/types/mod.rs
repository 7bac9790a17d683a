//! Core types for Open Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod credential;
pub mod id;
pub mod price;

pub use catalog::{CartLineItem, ProductPage, ProductSnapshot, SellerSummary, ShippingMethod};
pub use credential::{SessionCredential, UserProfile, UserType};
pub use id::*;
pub use price::Won;
