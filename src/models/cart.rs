//! Cart and price models
//!
//! The cart mirrors the remote order draft. All totals are backend-computed;
//! nothing here derives a price locally (tax and discount logic lives in the
//! backend).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A money amount as the backend serializes it: decimal string plus currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub number: String,
    pub currency_code: String,
}

impl Price {
    pub fn amount(&self) -> f64 {
        self.number.parse().unwrap_or(0.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount(), self.currency_code)
    }
}

/// A single line entry in the cart, referencing a purchasable variation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(deserialize_with = "super::string_or_number")]
    pub order_item_id: String,
    #[serde(deserialize_with = "super::string_or_number")]
    pub purchased_entity_id: String,
    pub title: String,
    #[serde(deserialize_with = "super::quantity_from_any")]
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Price,
}

/// The remote cart (an order draft).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(deserialize_with = "super::string_or_number")]
    pub order_id: String,
    #[serde(default)]
    pub order_number: String,
    pub total_price: Price,
    #[serde(default)]
    pub order_items: Vec<CartItem>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.order_items.is_empty()
    }
}
