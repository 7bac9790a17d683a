//! Cache types for product reads.

use open_market_core::{ProductId, ProductPage, ProductSnapshot};

/// Cache key for product reads.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products { page: u32 },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<ProductSnapshot>),
    Products(ProductPage),
}
