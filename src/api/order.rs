//! Placed order lookup (confirmation view)

use anyhow::{Context, Result};

use super::client::{check_response, StorefrontClient};
use crate::auth::SessionManager;
use crate::models::Order;

/// Fetch a placed order by id.
pub async fn fetch_order(client: &StorefrontClient, order_id: &str) -> Result<Order> {
    let resp = check_response(client.get(&format!("/api/order/{}", order_id)).await?).await?;
    resp.json().await.context("Failed to parse order response")
}

pub(crate) fn print_order(order: &Order) {
    println!();
    if order.order_number.is_empty() {
        println!("Order {} ({})", order.order_id, order.state);
    } else {
        println!("Order #{} ({})", order.order_number, order.state);
    }
    if !order.placed.is_empty() {
        println!("Placed: {}", order.placed_display());
    }
    if let Some(customer) = &order.customer {
        println!("Customer: {} <{}>", customer.name, customer.mail);
    }
    for item in &order.order_items {
        println!("  {}  x{}  = {}", item.title, item.quantity, item.total_price);
    }
    println!("Total: {}", order.total_price);
}

/// Show a placed order.
pub async fn show(base: Option<&str>, order_id: &str) -> Result<()> {
    let manager = SessionManager::connect(base).await?;
    let order = fetch_order(manager.client(), order_id).await?;
    print_order(&order);
    Ok(())
}
