//! Shared mock storefront backend for integration tests.
//!
//! A small axum app imitating the session, cart, order and checkout
//! endpoints, with switches for the failure modes the client must handle.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub struct MockBackend {
    requests: Mutex<Vec<String>>,
    bodies: Mutex<Vec<(String, Value)>>,
    cookies: Mutex<Vec<(String, Option<String>)>>,
    csrf_headers: Mutex<Vec<(String, Option<String>)>>,
    cart: Mutex<Option<Value>>,
    pub cart_available: AtomicBool,
    pub add_success: AtomicBool,
    pub login_ok: AtomicBool,
    pub logged_in: AtomicBool,
    pub logout_fails: AtomicBool,
    pub csrf_fails: AtomicBool,
    csrf_counter: AtomicUsize,
}

pub type Shared = Arc<MockBackend>;

impl MockBackend {
    pub fn new() -> Shared {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            cookies: Mutex::new(Vec::new()),
            csrf_headers: Mutex::new(Vec::new()),
            cart: Mutex::new(None),
            cart_available: AtomicBool::new(true),
            add_success: AtomicBool::new(true),
            login_ok: AtomicBool::new(true),
            logged_in: AtomicBool::new(false),
            logout_fails: AtomicBool::new(false),
            csrf_fails: AtomicBool::new(false),
            csrf_counter: AtomicUsize::new(0),
        })
    }

    fn record(&self, method: &str, path: &str, headers: &HeaderMap) {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}", method, path));
        let cookie = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.cookies.lock().unwrap().push((path.to_string(), cookie));
        let csrf = headers
            .get("x-csrf-token")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.csrf_headers
            .lock()
            .unwrap()
            .push((path.to_string(), csrf));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Drain the recorded requests, for "what happened since" assertions.
    pub fn take_requests(&self) -> Vec<String> {
        std::mem::take(&mut self.requests.lock().unwrap())
    }

    pub fn bodies(&self) -> Vec<(String, Value)> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn cookies(&self) -> Vec<(String, Option<String>)> {
        self.cookies.lock().unwrap().clone()
    }

    pub fn csrf_headers(&self) -> Vec<(String, Option<String>)> {
        self.csrf_headers.lock().unwrap().clone()
    }

    pub fn set_cart(&self, cart: Value) {
        *self.cart.lock().unwrap() = Some(cart);
    }
}

/// Cart fixture: items as (order_item_id, purchased_entity_id, title, quantity).
pub fn cart_fixture(items: &[(&str, &str, &str, u32)], total: &str) -> Value {
    let order_items: Vec<Value> = items
        .iter()
        .map(|(id, pid, title, qty)| {
            json!({
                "order_item_id": id,
                "purchased_entity_id": pid,
                "title": title,
                "quantity": qty,
                "unit_price": {"number": "10.00", "currency_code": "EUR"},
                "total_price": {"number": format!("{}.00", 10 * qty), "currency_code": "EUR"},
            })
        })
        .collect();
    json!({
        "order_id": "42",
        "order_number": "ORD-42",
        "total_price": {"number": total, "currency_code": "EUR"},
        "order_items": order_items,
    })
}

pub async fn spawn(state: Shared) -> String {
    let app = router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/session/token", get(csrf_token))
        .route("/user/login", post(login))
        .route("/user/logout", post(logout))
        .route("/user/login_status", get(login_status))
        .route("/user/register", post(register))
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add", post(cart_add))
        .route("/api/cart/remove", post(cart_remove))
        .route("/api/cart/update", post(cart_update))
        .route("/api/order/:id", get(get_order))
        .route("/api/checkout/paypal/create-order", post(paypal_create))
        .route("/api/checkout/paypal/capture-order", post(paypal_capture))
        .with_state(state)
}

async fn csrf_token(State(st): State<Shared>, headers: HeaderMap) -> Response {
    st.record("GET", "/session/token", &headers);
    if st.csrf_fails.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let n = st.csrf_counter.fetch_add(1, Ordering::SeqCst) + 1;
    format!("csrf-{}", n).into_response()
}

async fn login(State(st): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    st.record("POST", "/user/login", &headers);
    st.bodies
        .lock()
        .unwrap()
        .push(("/user/login".to_string(), body));

    if !st.login_ok.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Sorry, unrecognized username or password."})),
        )
            .into_response();
    }

    st.logged_in.store(true, Ordering::SeqCst);
    let mut resp = Json(json!({
        "current_user": {"uid": 12, "name": "alice", "roles": ["authenticated"]},
        "csrf_token": "login-csrf",
        "logout_token": "logout-tok",
    }))
    .into_response();
    resp.headers_mut().insert(
        header::SET_COOKIE,
        "SSESS1234=mock-session; Path=/; HttpOnly".parse().unwrap(),
    );
    resp
}

async fn logout(State(st): State<Shared>, headers: HeaderMap) -> Response {
    st.record("POST", "/user/logout", &headers);
    if st.logout_fails.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    st.logged_in.store(false, Ordering::SeqCst);
    Json(json!({})).into_response()
}

async fn login_status(State(st): State<Shared>, headers: HeaderMap) -> String {
    st.record("GET", "/user/login_status", &headers);
    if st.logged_in.load(Ordering::SeqCst) {
        "1".to_string()
    } else {
        "0".to_string()
    }
}

async fn register(State(st): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    st.record("POST", "/user/register", &headers);
    let name = body["name"]["value"].as_str().unwrap_or("user").to_string();
    let mail = body["mail"]["value"].as_str().unwrap_or("").to_string();
    st.bodies
        .lock()
        .unwrap()
        .push(("/user/register".to_string(), body));
    Json(json!({
        "uid": [{"value": 99}],
        "uuid": [{"value": "mock-uuid"}],
        "name": [{"value": name}],
        "mail": [{"value": mail}],
        "created": [{"value": "2024-01-01T00:00:00+00:00"}],
    }))
    .into_response()
}

async fn get_cart(State(st): State<Shared>, headers: HeaderMap) -> Response {
    st.record("GET", "/api/cart", &headers);
    if !st.cart_available.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    let cart = st
        .cart
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| cart_fixture(&[], "0.00"));
    Json(cart).into_response()
}

async fn cart_add(State(st): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    st.record("POST", "/api/cart/add", &headers);
    st.bodies
        .lock()
        .unwrap()
        .push(("/api/cart/add".to_string(), body));
    Json(json!({"success": st.add_success.load(Ordering::SeqCst)})).into_response()
}

async fn cart_remove(
    State(st): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    st.record("POST", "/api/cart/remove", &headers);
    let id = body[0]["order_item_id"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    st.bodies
        .lock()
        .unwrap()
        .push(("/api/cart/remove".to_string(), body));
    if let Some(cart) = st.cart.lock().unwrap().as_mut() {
        if let Some(items) = cart["order_items"].as_array_mut() {
            items.retain(|item| item["order_item_id"].as_str() != Some(id.as_str()));
        }
    }
    Json(json!({})).into_response()
}

async fn cart_update(
    State(st): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    st.record("POST", "/api/cart/update", &headers);
    let id = body[0]["order_item_id"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let quantity: u32 = body[0]["quantity"]
        .as_str()
        .and_then(|q| q.parse().ok())
        .unwrap_or(1);
    st.bodies
        .lock()
        .unwrap()
        .push(("/api/cart/update".to_string(), body));
    if let Some(cart) = st.cart.lock().unwrap().as_mut() {
        if let Some(items) = cart["order_items"].as_array_mut() {
            for item in items {
                if item["order_item_id"].as_str() == Some(id.as_str()) {
                    item["quantity"] = json!(quantity);
                }
            }
        }
    }
    Json(json!({})).into_response()
}

async fn get_order(
    State(st): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    st.record("GET", &format!("/api/order/{}", id), &headers);
    Json(json!({
        "order_id": id,
        "order_number": format!("ORD-{}", id),
        "state": "completed",
        "total_price": {"number": "59.80", "currency_code": "EUR"},
        "placed": "1700000000",
        "order_items": [{
            "title": "Intro Course",
            "quantity": 2,
            "total_price": {"number": "59.80", "currency_code": "EUR"},
        }],
        "customer": {"name": "alice", "mail": "alice@example.com"},
    }))
    .into_response()
}

async fn paypal_create(
    State(st): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    st.record("POST", "/api/checkout/paypal/create-order", &headers);
    st.bodies
        .lock()
        .unwrap()
        .push(("/api/checkout/paypal/create-order".to_string(), body));
    Json(json!({"paypal_order_id": "PAYPAL-123"})).into_response()
}

async fn paypal_capture(
    State(st): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    st.record("POST", "/api/checkout/paypal/capture-order", &headers);
    st.bodies
        .lock()
        .unwrap()
        .push(("/api/checkout/paypal/capture-order".to_string(), body));
    Json(json!({"success": true})).into_response()
}
