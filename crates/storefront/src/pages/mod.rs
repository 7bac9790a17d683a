//! Page-level state for the storefront screens.
//!
//! Each module owns one concern: the cart page, the product detail page, the
//! login/signup flows and the header status. Rendering is left to the caller.

pub mod auth;
pub mod cart;
pub mod header;
pub mod product;

pub use auth::{
    HOME_PATH, LoginOutcome, SignupError, UsernameCheck, check_username,
    resolve_post_login_target, submit_login, submit_signup,
};
pub use cart::{CartError, CartLine, CartPage, CartState, CartView, OrderSummary, Step};
pub use header::NavStatus;
pub use product::{AddToCartOutcome, ProductDetailPage, QuantitySelector};
