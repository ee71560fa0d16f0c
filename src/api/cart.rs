//! Cart synchronizer
//!
//! In-memory mirror of the remote cart. The remote is authoritative: every
//! mutation is followed by an unconditional full re-fetch, and totals are
//! never computed locally. There is no optimistic patching and no request
//! sequencing; overlapping mutations resolve last-response-wins.

use anyhow::Result;
use serde_json::json;

use super::client::StorefrontClient;
use crate::auth::SessionManager;
use crate::models::Cart;

const PURCHASED_ENTITY_TYPE: &str = "commerce_product_variation";

pub struct CartSynchronizer {
    client: StorefrontClient,
    cart: Option<Cart>,
    loading: bool,
}

impl CartSynchronizer {
    pub fn new(client: StorefrontClient) -> Self {
        Self {
            client,
            cart: None,
            loading: false,
        }
    }

    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Re-pull the authoritative cart. A non-OK response or unreadable body
    /// sets the mirror to None; no-data is preferred over stale data.
    pub async fn refresh_cart(&mut self) {
        match self.client.get("/api/cart").await {
            Ok(resp) if resp.status().is_success() => match resp.json::<Cart>().await {
                Ok(cart) => {
                    tracing::debug!("Cart refreshed: {} item(s)", cart.order_items.len());
                    self.cart = Some(cart);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse cart response: {:#}", e);
                    self.cart = None;
                }
            },
            Ok(resp) => {
                tracing::warn!("Failed to fetch cart: HTTP {}", resp.status());
                self.cart = None;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch cart: {:#}", e);
                self.cart = None;
            }
        }
    }

    /// Add a product variation. Resolves true only when the POST succeeds and
    /// the response body reports success; on false the mirror is untouched.
    pub async fn add_to_cart(&mut self, product_id: &str, quantity: u32) -> Result<bool> {
        self.loading = true;
        let result = self.do_add(product_id, quantity).await;
        self.loading = false;
        result
    }

    async fn do_add(&mut self, product_id: &str, quantity: u32) -> Result<bool> {
        let body = json!([{
            "purchased_entity_type": PURCHASED_ENTITY_TYPE,
            "purchased_entity_id": product_id,
            "quantity": quantity.to_string(),
        }]);
        let resp = self.client.post_json("/api/cart/add", &body).await?;
        let ok = resp.status().is_success();
        let payload = resp
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);

        if ok && truthy(payload.get("success")) {
            self.refresh_cart().await;
            Ok(true)
        } else {
            tracing::warn!("Add to cart rejected: {}", payload);
            Ok(false)
        }
    }

    /// Remove a line item, then re-fetch.
    pub async fn remove_from_cart(&mut self, order_item_id: &str) -> Result<()> {
        self.loading = true;
        let result = self.do_remove(order_item_id).await;
        self.loading = false;
        result
    }

    async fn do_remove(&mut self, order_item_id: &str) -> Result<()> {
        let body = json!([{ "order_item_id": order_item_id }]);
        let resp = self.client.post_json("/api/cart/remove", &body).await?;
        if resp.status().is_success() {
            self.refresh_cart().await;
        } else {
            tracing::warn!("Failed to remove cart item: HTTP {}", resp.status());
        }
        Ok(())
    }

    /// Set a line item quantity. Quantities below 1 are rejected as a no-op;
    /// removal goes through [`Self::remove_from_cart`].
    pub async fn update_quantity(&mut self, order_item_id: &str, quantity: u32) -> Result<()> {
        if quantity < 1 {
            return Ok(());
        }
        self.loading = true;
        let result = self.do_update(order_item_id, quantity).await;
        self.loading = false;
        result
    }

    async fn do_update(&mut self, order_item_id: &str, quantity: u32) -> Result<()> {
        let body = json!([{
            "order_item_id": order_item_id,
            "quantity": quantity.to_string(),
        }]);
        let resp = self.client.post_json("/api/cart/update", &body).await?;
        if resp.status().is_success() {
            self.refresh_cart().await;
        } else {
            tracing::warn!("Failed to update cart item: HTTP {}", resp.status());
        }
        Ok(())
    }

    /// Empty the cart by removing every line item in sequence (the backend
    /// has no bulk endpoint). No atomicity: a mid-sequence failure leaves a
    /// partially cleared cart.
    pub async fn clear_cart(&mut self) -> Result<()> {
        self.loading = true;
        let ids: Vec<String> = self
            .cart
            .as_ref()
            .map(|c| c.order_items.iter().map(|i| i.order_item_id.clone()).collect())
            .unwrap_or_default();
        for id in ids {
            if let Err(e) = self.do_remove(&id).await {
                tracing::warn!("Clear cart aborted: {:#}", e);
                break;
            }
        }
        self.loading = false;
        Ok(())
    }
}

/// Backend success flags come back as bool, number or string.
fn truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(serde_json::Value::String(s)) => !s.is_empty() && s != "0" && s != "false",
        _ => false,
    }
}

fn print_cart(cart: &Cart) {
    println!();
    if cart.order_number.is_empty() {
        println!("Cart (order id {})", cart.order_id);
    } else {
        println!("Cart #{} (order id {})", cart.order_number, cart.order_id);
    }
    for item in &cart.order_items {
        println!(
            "  [{}] {}  x{}  @ {}  = {}",
            item.order_item_id, item.title, item.quantity, item.unit_price, item.total_price
        );
    }
    if cart.is_empty() {
        println!("  (empty)");
    }
    println!("Total: {}", cart.total_price);
}

async fn connect(base: Option<&str>) -> Result<CartSynchronizer> {
    let manager = SessionManager::connect(base).await?;
    Ok(CartSynchronizer::new(manager.client().clone()))
}

/// Show the current cart.
pub async fn show(base: Option<&str>) -> Result<()> {
    let mut sync = connect(base).await?;
    sync.refresh_cart().await;
    match sync.cart() {
        Some(cart) => print_cart(cart),
        None => println!("No cart (empty session or backend unavailable)."),
    }
    Ok(())
}

/// Add a product variation to the cart.
pub async fn add(base: Option<&str>, product_id: &str, quantity: u32) -> Result<()> {
    let mut sync = connect(base).await?;
    if sync.add_to_cart(product_id, quantity).await? {
        println!("Added {} x{} to cart.", product_id, quantity);
        if let Some(cart) = sync.cart() {
            print_cart(cart);
        }
    } else {
        println!("The backend rejected the add (product unavailable?).");
    }
    Ok(())
}

/// Remove a line item (id from `cart show` output).
pub async fn remove(base: Option<&str>, order_item_id: &str) -> Result<()> {
    let mut sync = connect(base).await?;
    sync.remove_from_cart(order_item_id).await?;
    match sync.cart() {
        Some(cart) => print_cart(cart),
        None => println!("No cart."),
    }
    Ok(())
}

/// Update a line item quantity (id from `cart show` output).
pub async fn update(base: Option<&str>, order_item_id: &str, quantity: u32) -> Result<()> {
    if quantity < 1 {
        println!("Quantity must be at least 1; use 'cart remove' to drop the item.");
        return Ok(());
    }
    let mut sync = connect(base).await?;
    sync.update_quantity(order_item_id, quantity).await?;
    match sync.cart() {
        Some(cart) => print_cart(cart),
        None => println!("No cart."),
    }
    Ok(())
}

/// Remove every item from the cart.
pub async fn clear(base: Option<&str>) -> Result<()> {
    let mut sync = connect(base).await?;
    sync.refresh_cart().await;
    sync.clear_cart().await?;
    match sync.cart() {
        Some(cart) if cart.is_empty() => println!("Cart cleared."),
        Some(cart) => {
            println!("Cart partially cleared ({} item(s) left).", cart.order_items.len());
            print_cart(cart);
        }
        None => println!("Cart cleared."),
    }
    Ok(())
}
