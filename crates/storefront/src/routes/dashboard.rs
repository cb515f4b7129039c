//! Role dashboards.
//!
//! Both routes sit behind a role guard; by the time a handler runs the
//! visitor is known to hold the right role.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;

use crate::middleware::guard::SignedIn;
use crate::routes::PageChrome;
use crate::session::SessionStore;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: PageChrome,
    pub title: &'static str,
    pub user_name: String,
}

/// Display the seller dashboard.
pub async fn seller(
    SignedIn(user): SignedIn,
    store: SessionStore,
    session: Session,
) -> impl IntoResponse {
    DashboardTemplate {
        chrome: PageChrome::load(&store, &session).await,
        title: "Seller Dashboard",
        user_name: user.name,
    }
}

/// Display the admin dashboard.
pub async fn admin(
    SignedIn(user): SignedIn,
    store: SessionStore,
    session: Session,
) -> impl IntoResponse {
    DashboardTemplate {
        chrome: PageChrome::load(&store, &session).await,
        title: "Admin Dashboard",
        user_name: user.name,
    }
}
