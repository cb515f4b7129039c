//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;

use crate::routes::PageChrome;
use crate::session::SessionStore;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: PageChrome,
}

/// Display the home page.
pub async fn home(store: SessionStore, session: Session) -> impl IntoResponse {
    HomeTemplate {
        chrome: PageChrome::load(&store, &session).await,
    }
}
