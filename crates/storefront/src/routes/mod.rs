//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /signup                 - Signup page
//! POST /signup                 - Signup action
//! POST /logout                 - Logout action
//!
//! # Profile (requires auth)
//! GET  /profile                - Account, cart, and orders
//! POST /profile                - Update name, email, avatar
//! POST /profile/reviews        - Review a delivered order
//!
//! # Dashboards (requires role)
//! GET  /seller                 - Seller dashboard (SELLER)
//! GET  /admin                  - Admin dashboard (ADMIN)
//! ```

pub mod auth;
pub mod dashboard;
pub mod home;
pub mod profile;

use axum::{
    Router,
    http::Uri,
    middleware::from_fn_with_state,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;
use uuid::Uuid;

use medistore_core::Role;

use crate::error::AppError;
use crate::middleware::guard::{RouteGuard, enforce};
use crate::notifications::{Toast, push_toast, take_toasts};
use crate::session::SessionStore;
use crate::state::AppState;

// =============================================================================
// Shared page data
// =============================================================================

/// Navigation state and pending notifications, shown on every page.
#[derive(Debug, Clone, Default)]
pub struct PageChrome {
    /// Name of the signed-in user; `None` shows the Login/Sign up links.
    pub user_name: Option<String>,
    pub toasts: Vec<Toast>,
}

impl PageChrome {
    /// Read the navigation state and drain queued notifications.
    pub async fn load(store: &SessionStore, session: &Session) -> Self {
        Self {
            user_name: store.user().map(|user| user.name),
            toasts: take_toasts(session).await,
        }
    }

    /// Show `toast` on this render without queueing it.
    #[must_use]
    pub fn with_toast(mut self, toast: Toast) -> Self {
        self.toasts.push(toast);
        self
    }
}

/// Fresh nonce for a rendered form.
#[must_use]
pub fn new_form_id() -> String {
    Uuid::new_v4().to_string()
}

/// Queue `toast` and redirect (post/redirect/get).
pub async fn redirect_with(session: &Session, to: &str, toast: Toast) -> Response {
    push_toast(session, toast).await;
    Redirect::to(to).into_response()
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the profile routes router (any signed-in user).
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::show).post(profile::update))
        .route("/profile/reviews", post(profile::review))
        .route_layer(from_fn_with_state(RouteGuard::authenticated(), enforce))
}

/// Create the role-restricted dashboard routers.
pub fn dashboard_routes() -> Router<AppState> {
    let seller = Router::new()
        .route("/seller", get(dashboard::seller))
        .route_layer(from_fn_with_state(RouteGuard::role(Role::Seller), enforce));

    let admin = Router::new()
        .route("/admin", get(dashboard::admin))
        .route_layer(from_fn_with_state(RouteGuard::role(Role::Admin), enforce));

    seller.merge(admin)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(dashboard_routes())
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the MediStore API.
pub async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
