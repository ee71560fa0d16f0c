//! PayPal checkout delegation
//!
//! Payment capture lives in the backend; this layer only drives the
//! create-order / capture-order endpoints and never touches card data.

use anyhow::{bail, Context, Result};
use serde_json::json;

use super::cart::CartSynchronizer;
use super::client::{check_response, StorefrontClient};
use super::order;
use crate::auth::SessionManager;

/// Create a PayPal order for the given cart order; returns the PayPal order
/// id the buyer approves.
pub async fn create_paypal_order(client: &StorefrontClient, order_id: &str) -> Result<String> {
    let body = json!({ "order_id": order_id });
    let resp = check_response(
        client
            .post_json("/api/checkout/paypal/create-order", &body)
            .await?,
    )
    .await?;
    let payload: serde_json::Value = resp
        .json()
        .await
        .context("Failed to parse create-order response")?;
    payload
        .get("paypal_order_id")
        .and_then(|v| v.as_str())
        .map(String::from)
        .context("No paypal_order_id in create-order response")
}

/// Capture an approved PayPal order. Returns true when the backend reports
/// the payment captured.
pub async fn capture_paypal_order(
    client: &StorefrontClient,
    paypal_order_id: &str,
    order_id: &str,
) -> Result<bool> {
    let body = json!({
        "paypal_order_id": paypal_order_id,
        "order_id": order_id,
    });
    let resp = check_response(
        client
            .post_json("/api/checkout/paypal/capture-order", &body)
            .await?,
    )
    .await?;
    let payload: serde_json::Value = resp
        .json()
        .await
        .context("Failed to parse capture-order response")?;
    Ok(payload
        .get("success")
        .and_then(|v| v.as_bool())
        .unwrap_or(false))
}

async fn current_order_id(sync: &mut CartSynchronizer) -> Result<String> {
    sync.refresh_cart().await;
    match sync.cart() {
        Some(cart) if !cart.is_empty() => Ok(cart.order_id.clone()),
        Some(_) => bail!("Cart is empty; nothing to check out."),
        None => bail!("No cart; nothing to check out."),
    }
}

/// Start checkout for the current cart.
pub async fn create(base: Option<&str>) -> Result<()> {
    let manager = SessionManager::connect(base).await?;
    if !manager.is_authenticated() {
        bail!("Checkout requires a logged-in session. Run 'storefront-cli login'.");
    }
    let mut sync = CartSynchronizer::new(manager.client().clone());
    let order_id = current_order_id(&mut sync).await?;

    let paypal_order_id = create_paypal_order(manager.client(), &order_id).await?;
    println!("PayPal order created: {}", paypal_order_id);
    println!("Approve it in PayPal, then run:");
    println!("  storefront-cli checkout capture {}", paypal_order_id);
    Ok(())
}

/// Capture an approved PayPal order for the current cart.
pub async fn capture(base: Option<&str>, paypal_order_id: &str) -> Result<()> {
    let manager = SessionManager::connect(base).await?;
    let mut sync = CartSynchronizer::new(manager.client().clone());
    let order_id = current_order_id(&mut sync).await?;

    if capture_paypal_order(manager.client(), paypal_order_id, &order_id).await? {
        println!("Payment captured.");
        match order::fetch_order(manager.client(), &order_id).await {
            Ok(order) => order::print_order(&order),
            Err(e) => tracing::warn!("Failed to fetch order confirmation: {:#}", e),
        }
    } else {
        bail!("Payment capture failed; the order was not completed.");
    }
    Ok(())
}
