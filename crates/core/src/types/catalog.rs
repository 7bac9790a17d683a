//! Product and cart snapshots as returned by the Open Market API.

use serde::{Deserialize, Serialize};

use super::id::{CartItemId, ProductId};
use super::price::Won;

/// How a seller ships a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShippingMethod {
    /// Courier parcel delivery.
    #[default]
    Parcel,
    /// Delivered directly by the seller.
    #[serde(other)]
    Delivery,
}

impl ShippingMethod {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Parcel => "Parcel delivery",
            Self::Delivery => "Direct delivery",
        }
    }
}

/// Seller fields embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SellerSummary {
    /// Storefront name shown on product cards and cart lines.
    #[serde(default)]
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A product as embedded in listings, detail responses and cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Unit price.
    pub price: Won,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    /// Flat shipping fee charged once per cart line.
    #[serde(default)]
    pub shipping_fee: Won,
    /// Units available.
    pub stock: u32,
    #[serde(default)]
    pub seller: SellerSummary,
}

impl ProductSnapshot {
    /// Whether no units are left.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.stock == 0
    }

    /// Seller store name, or a generic label when the API omits it.
    #[must_use]
    pub fn store_label(&self) -> &str {
        if self.seller.store_name.is_empty() {
            "Seller"
        } else {
            &self.seller.store_name
        }
    }

    /// Shipping fee label: free when the fee is zero.
    #[must_use]
    pub fn shipping_fee_label(&self) -> String {
        if self.shipping_fee.is_zero() {
            "Free shipping".to_string()
        } else {
            format!("Shipping {}", self.shipping_fee)
        }
    }

    /// Combined delivery label, e.g. `Parcel delivery / Free shipping`.
    #[must_use]
    pub fn delivery_label(&self) -> String {
        format!(
            "{} / {}",
            self.shipping_method.label(),
            self.shipping_fee_label()
        )
    }
}

/// One page of `GET /products/`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<ProductSnapshot>,
}

/// One product-quantity pairing in the user's server-side cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Cart line id (`/cart/{id}/`).
    #[serde(rename = "id", alias = "cart_item_id")]
    pub cart_id: CartItemId,
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartLineItem {
    /// Unit price times quantity, shipping excluded.
    #[must_use]
    pub fn line_total(&self) -> Won {
        self.product.price.times(self.quantity)
    }

    /// Whether one more unit is allowed by stock.
    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity < self.product.stock
    }

    /// Whether one fewer unit keeps the minimum of one.
    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.quantity > 1
    }
}
