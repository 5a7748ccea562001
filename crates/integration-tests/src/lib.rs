//! Integration tests for Spice Pantry.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p spice-pantry-integration-tests
//! ```
//!
//! Each test spins up an in-process mock of the remote storefront backend
//! (order, catalog, and auth endpoints) on an ephemeral port and drives
//! the real storefront library against it. The mock's failure modes are
//! switchable per test, which is how the checkout fallback protocol
//! (guest retry on 401, hard stop on 400, offline confirmation on
//! transport failure) gets exercised end to end.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Test-support crate: failing loudly is the point.
#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use url::Url;

use spice_pantry_core::Price;
use spice_pantry_storefront::cart::{CartAction, CartLine, CartStore};
use spice_pantry_storefront::checkout::{CheckoutStep, CheckoutWorkflow, DeliveryDetails};
use spice_pantry_storefront::config::StorefrontConfig;
use spice_pantry_storefront::session::Session;
use spice_pantry_storefront::storage::LocalStore;

/// Credentials the mock auth endpoints accept.
pub const TEST_EMAIL: &str = "asha@example.com";
pub const TEST_PASSWORD: &str = "spicy-secret";
/// The bearer token the mock backend issues and honors.
pub const TEST_TOKEN: &str = "test-token-abc123";
pub const TEST_USER_ID: &str = "66b1f0aa12cd34ef56ab78cd";
pub const TEST_NAME: &str = "Asha Kumar";

/// How the mock order endpoints behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderMode {
    /// Accept orders on both endpoints.
    Accept,
    /// Reject the authenticated endpoint with 401; the guest endpoint
    /// still accepts. Exercises the guest retry.
    RejectAuth,
    /// Reject both endpoints with 400 and this message. Exercises the
    /// hard stop.
    RejectInvalid(String),
    /// Reject the authenticated endpoint with 401 and the guest endpoint
    /// with 400. Exercises a failed guest retry.
    GuestRejectInvalid(String),
    /// Fail both endpoints with 500. Exercises the offline policy.
    ServerError,
}

/// Which field the mock reports new order ids under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStyle {
    MongoId,
    OrderId,
    /// Report no id at all; the workflow must synthesize one.
    Omit,
}

/// Shared state behind the mock backend.
pub struct BackendState {
    pub orders: Mutex<Vec<Value>>,
    pub order_mode: Mutex<OrderMode>,
    pub id_style: Mutex<IdStyle>,
    pub products: Mutex<Vec<Value>>,
    counter: AtomicU32,
}

impl BackendState {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            orders: Mutex::new(Vec::new()),
            order_mode: Mutex::new(OrderMode::Accept),
            id_style: Mutex::new(IdStyle::OrderId),
            products: Mutex::new(fixture_products()),
            counter: AtomicU32::new(1),
        })
    }

    /// Switch the order endpoints' behavior.
    pub fn set_order_mode(&self, mode: OrderMode) {
        *self.order_mode.lock().unwrap() = mode;
    }

    /// Switch which field new order ids are reported under.
    pub fn set_id_style(&self, style: IdStyle) {
        *self.id_style.lock().unwrap() = style;
    }

    /// Number of orders the backend has accepted.
    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

fn fixture_products() -> Vec<Value> {
    vec![
        json!({
            "_id": "sp-turmeric",
            "name": "Turmeric Powder",
            "fullName": "Organic Turmeric Powder",
            "description": "High-quality organic turmeric powder with curcumin.",
            "price": {"amount": "120", "currencyCode": "INR"},
            "weight": "250g",
            "stock": 100,
            "category": "Spices",
            "imageUrl": "/images/turmeric.jpg",
            "features": ["No additives", "Stone ground"],
            "isActive": true
        }),
        json!({
            "_id": "sp-chilli",
            "name": "Red Chilli Powder",
            "fullName": "Premium Red Chilli Powder - Extra Hot",
            "description": "Spicy red chilli powder made from selected chilies.",
            "price": {"amount": "95", "currencyCode": "INR"},
            "weight": "200g",
            "stock": 150,
            "category": "Spices",
            "imageUrl": "/images/chilli.jpg",
            "features": [],
            "isActive": true
        }),
        json!({
            "_id": "sp-garam",
            "name": "Garam Masala",
            "fullName": "Traditional Garam Masala Blend",
            "description": "A perfect blend of aromatic spices for Indian cooking.",
            "price": {"amount": "140", "currencyCode": "INR"},
            "weight": "150g",
            "stock": 75,
            "category": "Blends",
            "imageUrl": "/images/garam-masala.jpg",
            "features": [],
            "isActive": true
        }),
    ]
}

// =============================================================================
// Mock backend handlers
// =============================================================================

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn accept_order(state: &BackendState, mut draft: Value) -> (StatusCode, Json<Value>) {
    let n = state.counter.fetch_add(1, Ordering::SeqCst);
    let order_id = format!("ORD-{:06}", 100_000 + n);
    let mongo_id = format!("66f0{n:08x}");

    if let Some(obj) = draft.as_object_mut() {
        obj.insert("_id".to_string(), json!(mongo_id));
        obj.insert("orderId".to_string(), json!(order_id));
        obj.insert("status".to_string(), json!("pending"));
    }
    state.orders.lock().unwrap().push(draft);

    let body = match *state.id_style.lock().unwrap() {
        IdStyle::MongoId => json!({"success": true, "_id": mongo_id}),
        IdStyle::OrderId => json!({"success": true, "orderId": order_id}),
        IdStyle::Omit => json!({"success": true, "message": "Order received"}),
    };
    (StatusCode::CREATED, Json(body))
}

async fn create_order(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(draft): Json<Value>,
) -> impl IntoResponse {
    let mode = state.order_mode.lock().unwrap().clone();

    let auth_rejected = matches!(
        mode,
        OrderMode::RejectAuth | OrderMode::GuestRejectInvalid(_)
    );
    if auth_rejected || bearer(&headers) != Some(TEST_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Not authorized, token failed"})),
        );
    }

    match mode {
        OrderMode::RejectInvalid(message) => {
            (StatusCode::BAD_REQUEST, Json(json!({"message": message})))
        }
        OrderMode::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Internal server error"})),
        ),
        OrderMode::Accept | OrderMode::RejectAuth | OrderMode::GuestRejectInvalid(_) => {
            accept_order(&state, draft)
        }
    }
}

async fn create_guest_order(
    State(state): State<Arc<BackendState>>,
    Json(draft): Json<Value>,
) -> impl IntoResponse {
    let mode = state.order_mode.lock().unwrap().clone();
    match mode {
        OrderMode::RejectInvalid(message) | OrderMode::GuestRejectInvalid(message) => {
            (StatusCode::BAD_REQUEST, Json(json!({"message": message})))
        }
        OrderMode::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Internal server error"})),
        ),
        OrderMode::Accept | OrderMode::RejectAuth => accept_order(&state, draft),
    }
}

async fn user_orders(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if bearer(&headers) != Some(TEST_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Not authorized, token failed"})),
        );
    }
    let orders = state.orders.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({"orders": orders})))
}

fn order_matches(order: &Value, id: &str) -> bool {
    order.get("_id").and_then(Value::as_str) == Some(id)
        || order.get("orderId").and_then(Value::as_str) == Some(id)
}

async fn get_order(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let orders = state.orders.lock().unwrap();
    orders.iter().find(|o| order_matches(o, &id)).map_or_else(
        || {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Order not found"})),
            )
        },
        |order| (StatusCode::OK, Json(order.clone())),
    )
}

async fn cancel_order(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if bearer(&headers) != Some(TEST_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Not authorized, token failed"})),
        );
    }

    let mut orders = state.orders.lock().unwrap();
    let Some(order) = orders.iter_mut().find(|o| order_matches(o, &id)) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Order not found"})),
        );
    };

    if order.get("status").and_then(Value::as_str) != Some("pending") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Only pending orders can be cancelled"})),
        );
    }

    if let Some(obj) = order.as_object_mut() {
        obj.insert("status".to_string(), json!("cancelled"));
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Order cancelled"})),
    )
}

async fn list_products(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> impl IntoResponse {
    let products = state.products.lock().unwrap();
    let filtered: Vec<Value> = products
        .iter()
        .filter(|p| {
            params.get("search").is_none_or(|needle| {
                p.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&needle.to_lowercase()))
            })
        })
        .filter(|p| {
            params.get("category").is_none_or(|category| {
                p.get("category").and_then(Value::as_str) == Some(category.as_str())
            })
        })
        .cloned()
        .collect();

    let body = json!({
        "success": true,
        "products": filtered,
        "pagination": {
            "currentPage": 1,
            "totalPages": 1,
            "totalProducts": filtered.len(),
            "hasNext": false,
            "hasPrev": false
        }
    });
    (StatusCode::OK, Json(body))
}

async fn get_product(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let products = state.products.lock().unwrap();
    products
        .iter()
        .find(|p| p.get("_id").and_then(Value::as_str) == Some(id.as_str()))
        .map_or_else(
            || {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "Product not found"})),
                )
            },
            |product| (StatusCode::OK, Json(json!({"success": true, "product": product}))),
        )
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);

    if email == Some(TEST_EMAIL) && password == Some(TEST_PASSWORD) {
        (
            StatusCode::OK,
            Json(json!({
                "token": TEST_TOKEN,
                "_id": TEST_USER_ID,
                "name": TEST_NAME,
                "email": TEST_EMAIL
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
    }
}

async fn signup(Json(body): Json<Value>) -> impl IntoResponse {
    let name = body.get("name").and_then(Value::as_str).unwrap_or("");
    let email = body.get("email").and_then(Value::as_str).unwrap_or("");
    (
        StatusCode::CREATED,
        Json(json!({
            "token": TEST_TOKEN,
            "_id": "66b1f0aa12cd34ef56ab78ce",
            "name": name,
            "email": email
        })),
    )
}

async fn me(headers: HeaderMap) -> impl IntoResponse {
    if bearer(&headers) == Some(TEST_TOKEN) {
        (
            StatusCode::OK,
            Json(json!({
                "_id": TEST_USER_ID,
                "name": TEST_NAME,
                "email": TEST_EMAIL
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Not authorized, token failed"})),
        )
    }
}

fn router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/guest", post(create_guest_order))
        .route("/orders/user", get(user_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/cancel", put(cancel_order))
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/me", get(me))
        .with_state(state)
}

async fn spawn_backend(state: Arc<BackendState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Grab an address nothing is listening on, for transport-failure tests.
async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

// =============================================================================
// TestContext
// =============================================================================

/// One test's world: a mock backend, a storefront config pointing at it,
/// and a fresh local storage directory.
pub struct TestContext {
    pub state: Arc<BackendState>,
    pub config: StorefrontConfig,
    pub store: LocalStore,
}

impl TestContext {
    /// Spin up a mock backend and point a fresh storefront at it.
    pub async fn new() -> Self {
        let state = BackendState::new();
        let addr = spawn_backend(Arc::clone(&state)).await;
        Self::with_addr(state, addr)
    }

    /// A storefront pointed at an address that refuses connections.
    pub async fn offline() -> Self {
        let state = BackendState::new();
        let addr = dead_addr().await;
        Self::with_addr(state, addr)
    }

    fn with_addr(state: Arc<BackendState>, addr: SocketAddr) -> Self {
        let base_url: Url = format!("http://{addr}/").parse().unwrap();
        let mut config = StorefrontConfig::for_base_url(base_url);
        config.data_dir =
            std::env::temp_dir().join(format!("sp-itest-{}", uuid::Uuid::new_v4()));
        // Keep the offline fallback delay out of the test's critical path.
        config.checkout.offline_confirm_delay = std::time::Duration::from_millis(50);

        let store = LocalStore::open(&config.data_dir).unwrap();
        Self {
            state,
            config,
            store,
        }
    }

    /// Log in against the mock backend and persist the session.
    pub async fn login(&self) -> Session {
        let client = spice_pantry_storefront::api::AuthClient::new(&self.config);
        let response = client.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();

        let mut session = Session::load(&self.store);
        session
            .establish(
                response.profile,
                secrecy::SecretString::from(response.token),
                &self.store,
            )
            .unwrap();
        session
    }

    /// A cart holding two fixture products.
    pub fn seeded_cart(&self) -> CartStore {
        let mut cart = CartStore::load(&self.store);
        cart.dispatch(CartAction::Add {
            line: fixture_line("sp-turmeric", "Turmeric Powder", 120, Some(100)),
            quantity: 2,
        })
        .unwrap();
        cart.dispatch(CartAction::Add {
            line: fixture_line("sp-garam", "Garam Masala", 140, Some(75)),
            quantity: 1,
        })
        .unwrap();
        cart
    }

    /// A delivery form that passes every validation rule.
    #[must_use]
    pub fn valid_details() -> DeliveryDetails {
        DeliveryDetails {
            full_name: TEST_NAME.to_string(),
            email: TEST_EMAIL.to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 Spice Market Road, T Nagar".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            zip: "600017".to_string(),
        }
    }

    /// A workflow advanced to the Review step with valid details.
    #[must_use]
    pub fn review_workflow(&self) -> CheckoutWorkflow {
        let mut workflow = CheckoutWorkflow::new(self.config.checkout);
        workflow.set_delivery(Self::valid_details());
        assert_eq!(workflow.next().unwrap(), CheckoutStep::Payment);
        assert_eq!(workflow.next().unwrap(), CheckoutStep::Review);
        workflow
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.config.data_dir);
    }
}

/// Build a cart line like the catalog would.
#[must_use]
pub fn fixture_line(id: &str, name: &str, rupees: i64, stock: Option<u32>) -> CartLine {
    CartLine {
        id: id.into(),
        name: name.to_string(),
        price: Price::rupees(Decimal::from(rupees)),
        quantity: 1,
        stock,
        image: None,
        weight: None,
        category: None,
    }
}
