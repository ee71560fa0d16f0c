//! API client module for the storefront backend

pub mod cart;
pub mod checkout;
pub mod client;
pub mod order;

use anyhow::Result;

pub use cart::CartSynchronizer;
pub use client::{ApiError, StorefrontClient};

/// Show the current cart
pub async fn show_cart(base: Option<&str>) -> Result<()> {
    cart::show(base).await
}

/// Add a product variation to the cart
pub async fn add_to_cart(base: Option<&str>, product_id: &str, quantity: u32) -> Result<()> {
    cart::add(base, product_id, quantity).await
}

/// Remove a line item from the cart
pub async fn remove_from_cart(base: Option<&str>, order_item_id: &str) -> Result<()> {
    cart::remove(base, order_item_id).await
}

/// Update a line item quantity
pub async fn update_quantity(base: Option<&str>, order_item_id: &str, quantity: u32) -> Result<()> {
    cart::update(base, order_item_id, quantity).await
}

/// Remove every item from the cart
pub async fn clear_cart(base: Option<&str>) -> Result<()> {
    cart::clear(base).await
}

/// Show a placed order
pub async fn show_order(base: Option<&str>, order_id: &str) -> Result<()> {
    order::show(base, order_id).await
}

/// Start PayPal checkout for the current cart
pub async fn checkout_create(base: Option<&str>) -> Result<()> {
    checkout::create(base).await
}

/// Capture an approved PayPal order
pub async fn checkout_capture(base: Option<&str>, paypal_order_id: &str) -> Result<()> {
    checkout::capture(base, paypal_order_id).await
}
