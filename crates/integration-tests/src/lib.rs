//! Integration tests for the MediStore storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p medistore-integration-tests
//! ```
//!
//! Each test starts its own fake MediStore API and storefront on ephemeral
//! ports, so nothing external is required.
//!
//! # Fake API accounts
//!
//! | Email                 | Role     |
//! |-----------------------|----------|
//! | `customer@example.com`| CUSTOMER |
//! | `seller@example.com`  | SELLER   |
//! | `admin@example.com`   | ADMIN    |
//!
//! Every account's password is [`PASSWORD`]; any other password is rejected
//! with `{"message": "Invalid credentials"}`.
//!
//! # Failure switches
//!
//! - [`FakeApi::fail_orders`] - `GET /orders` answers 500 with a message
//! - [`FakeApi::fail_profile_update`] - `PUT /auth/me` answers 409 with
//!   [`PROFILE_UPDATE_CONFLICT`]
//! - [`FakeApi::fail_without_message`] - `POST /auth/register` and
//!   `PUT /auth/me` answer 500 with a plain-text body

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::{Client, redirect::Policy};
use serde_json::{Value, json};

use medistore_storefront::config::{ApiConfig, StorefrontConfig};
use medistore_storefront::state::AppState;

/// Password accepted for every fake account.
pub const PASSWORD: &str = "secret1";

/// Token issued by the fake API on login.
pub const TOKEN: &str = "t1";

/// Email the fake API treats as already registered.
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// Message sent when a profile update is refused.
pub const PROFILE_UPDATE_CONFLICT: &str = "Email already in use";

// =============================================================================
// Fake MediStore API
// =============================================================================

/// One request seen by the fake API.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// Recorded traffic and failure switches for the fake API.
#[derive(Debug, Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    fail_orders: AtomicBool,
    fail_profile_update: AtomicBool,
    fail_without_message: AtomicBool,
}

impl FakeApi {
    /// Requests whose path ends with `suffix`.
    pub fn calls_to(&self, suffix: &str) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.path.ends_with(suffix))
            .cloned()
            .collect()
    }

    /// Total number of requests received.
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Make `GET /orders` answer 500 with a message.
    pub fn fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Make `PUT /auth/me` answer 409 with [`PROFILE_UPDATE_CONFLICT`].
    pub fn fail_profile_update(&self, fail: bool) {
        self.fail_profile_update.store(fail, Ordering::SeqCst);
    }

    /// Make registration and profile updates answer 500 without a JSON body.
    pub fn fail_without_message(&self, fail: bool) {
        self.fail_without_message.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

async fn record_call(State(api): State<Arc<FakeApi>>, request: Request, next: Next) -> Response {
    api.record(Call {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    });
    next.run(request).await
}

fn user_json(email: &str, name: &str) -> Value {
    let (id, role) = match email {
        "admin@example.com" => (3, "ADMIN"),
        "seller@example.com" => (2, "SELLER"),
        _ => (1, "CUSTOMER"),
    };
    json!({
        "id": id,
        "name": name,
        "email": email,
        "role": role,
        "status": "ACTIVE"
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn bare_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "You are not authorized"})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    Json(json!({"token": TOKEN, "user": user_json(email, "Rahim")})).into_response()
}

async fn register(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> Response {
    if api.fail_without_message.load(Ordering::SeqCst) {
        return bare_server_error();
    }
    if body["email"] == TAKEN_EMAIL {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Email already registered"})),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(json!({"success": true}))).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(user_json("customer@example.com", "Rahim")).into_response()
}

async fn update_me(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if api.fail_without_message.load(Ordering::SeqCst) {
        return bare_server_error();
    }
    if api.fail_profile_update.load(Ordering::SeqCst) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": PROFILE_UPDATE_CONFLICT})),
        )
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    let name = body["name"].as_str().unwrap_or_default();
    let mut user = user_json(email, name);
    user["avatar"] = body["avatar"].clone();
    Json(user).into_response()
}

async fn cart(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        {"id": 1, "medicine": {"id": 10, "name": "Napa Extra", "price": 2.5}, "quantity": 4},
        {"id": 2, "medicine": {"id": 11, "name": "Seclo 20", "price": "7.00"}, "quantity": 1}
    ]))
    .into_response()
}

async fn orders(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if api.fail_orders.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Orders service down"})),
        )
            .into_response();
    }
    let napa = json!({"id": 10, "name": "Napa Extra", "price": 2.5});
    Json(json!([
        {"id": 100, "status": "DELIVERED", "address": "House 4, Dhanmondi", "totalPrice": 10.0,
         "items": [{"medicine": napa, "quantity": 4}], "reviewGiven": false},
        {"id": 101, "status": "DELIVERED", "totalPrice": 5.0,
         "items": [{"medicine": napa, "quantity": 2}], "reviewGiven": true},
        {"id": 102, "status": "SHIPPED", "totalPrice": 2.5,
         "items": [{"medicine": napa, "quantity": 1}]}
    ]))
    .into_response()
}

async fn reviews(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["orderId"] == 101 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Order already reviewed"})),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(json!({"success": true}))).into_response()
}

fn fake_api_router(api: Arc<FakeApi>) -> Router {
    let routes = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me).put(update_me))
        .route("/cart", get(cart))
        .route("/orders", get(orders))
        .route("/reviews", post(reviews))
        .with_state(api.clone());

    Router::new()
        .nest("/api", routes)
        .layer(from_fn_with_state(api, record_call))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server error");
    });
    addr
}

// =============================================================================
// Test context
// =============================================================================

/// A running storefront wired to a fresh fake API, plus a browser-like client.
pub struct TestContext {
    pub api: Arc<FakeApi>,
    pub base_url: String,
    pub client: Client,
}

impl TestContext {
    /// Start the fake API and the storefront.
    pub async fn start() -> Self {
        let api = Arc::new(FakeApi::default());
        let api_addr = serve(fake_api_router(api.clone())).await;

        let config = StorefrontConfig {
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            api: ApiConfig::new(&format!("http://{api_addr}/api"), Duration::from_secs(5))
                .expect("Invalid fake API URL"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).expect("Failed to build application state");
        let storefront_addr = serve(medistore_storefront::app(state)).await;

        Self {
            api,
            base_url: format!("http://{storefront_addr}"),
            client: new_browser(),
        }
    }

    /// A second visitor with its own cookie jar.
    #[must_use]
    pub fn new_visitor(&self) -> Client {
        new_browser()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` without following redirects.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    /// GET `path` and return the body text.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("Body was not text")
    }

    /// POST a form to `path` without following redirects.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("POST failed")
    }

    /// Sign in as `email` and drain the success notification.
    pub async fn login_as(&self, email: &str) {
        let response = self
            .post_form("/login", &[("email", email), ("password", PASSWORD)])
            .await;
        assert_eq!(location(&response), Some("/"), "login did not redirect home");
        let home = self.page("/").await;
        assert!(home.contains("Login successful!"));
    }
}

fn new_browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Number of notifications rendered on a page.
#[must_use]
pub fn toast_count(body: &str) -> usize {
    body.matches("class=\"toast toast-").count()
}
