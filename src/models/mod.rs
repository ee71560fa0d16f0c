//! Data models for the storefront backend

pub mod cart;
pub mod order;
pub mod user;

pub use cart::{Cart, CartItem, Price};
pub use order::{Order, OrderCustomer, OrderItem};
pub use user::UserProfile;

use serde::{de, Deserialize, Deserializer};

/// The backend is inconsistent about identifier types: entity IDs arrive as
/// JSON numbers from some endpoints and as strings from others. Normalize to
/// strings on the way in.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Quantities arrive as integers, floats or decimal strings ("2.00").
pub(crate) fn quantity_from_any<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let qty = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    qty.map(|q| q as u32)
        .ok_or_else(|| de::Error::custom(format!("invalid quantity: {}", value)))
}
