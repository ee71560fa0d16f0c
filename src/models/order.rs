//! Placed order models (confirmation view)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Price;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub title: String,
    #[serde(deserialize_with = "super::quantity_from_any")]
    pub quantity: u32,
    pub total_price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCustomer {
    pub name: String,
    #[serde(default)]
    pub mail: String,
}

/// A placed order as returned by `/api/order/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "super::string_or_number")]
    pub order_id: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub state: String,
    pub total_price: Price,
    #[serde(default)]
    pub placed: String,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    pub customer: Option<OrderCustomer>,
}

impl Order {
    /// Human-readable placed timestamp. The backend sends either RFC 3339 or
    /// a unix epoch in seconds; fall back to the raw value.
    pub fn placed_display(&self) -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.placed) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
        if let Ok(secs) = self.placed.parse::<i64>() {
            if let Some(dt) = DateTime::<Utc>::from_timestamp(secs, 0) {
                return dt.format("%Y-%m-%d %H:%M").to_string();
            }
        }
        self.placed.clone()
    }
}
