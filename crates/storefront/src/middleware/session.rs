//! Session middleware configuration.
//!
//! Visitors' sessions live in tower-sessions (in-memory store, cookie
//! `ms_session`). Handlers never touch that record directly: the
//! [`session_context_middleware`] copies the session keys into a request-scoped
//! [`MemoryStorage`], hands handlers a [`SessionStore`] over it, and writes the
//! journaled changes back once the handler is done.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::Span;

use crate::config::StorefrontConfig;
use crate::error::set_sentry_user;
use crate::session::{Change, MemoryStorage, SessionEvents, SessionStore, keys};
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ms_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Bridge the tower-sessions record to a [`SessionStore`] for one request.
///
/// Without a session layer (or if the record cannot be read) the handler gets
/// a detached store, so every read answers `None`.
pub async fn session_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let snapshot = match &session {
        Some(session) => load_snapshot(session).await,
        None => None,
    };

    let events = state.session_events().clone();
    let store = match &snapshot {
        Some(storage) => SessionStore::new(storage.clone(), events),
        None => SessionStore::detached(events),
    };

    if let Some(user) = store.user() {
        Span::current().record("user_id", user.id.as_i64());
        set_sentry_user(&user.id, Some(&user.email));
    }

    request.extensions_mut().insert(store);
    let response = next.run(request).await;

    if let (Some(session), Some(storage)) = (session, snapshot) {
        write_back(&session, &storage).await;
    }

    response
}

/// Copy the session keys into a fresh [`MemoryStorage`].
async fn load_snapshot(session: &Session) -> Option<Arc<MemoryStorage>> {
    let mut items = Vec::with_capacity(2);
    for key in [keys::TOKEN, keys::USER] {
        match session.get::<String>(key).await {
            Ok(Some(value)) => items.push((key, value)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, key, "Failed to load session, continuing without one");
                return None;
            }
        }
    }
    Some(Arc::new(MemoryStorage::with_items(items)))
}

/// Persist whatever the handler changed.
///
/// A new token rotates the session id so a pre-login cookie cannot be reused.
async fn write_back(session: &Session, storage: &MemoryStorage) {
    let changes = storage.take_changes();
    if changes.is_empty() {
        return;
    }

    let signed_in = changes
        .iter()
        .any(|(key, change)| key == keys::TOKEN && matches!(change, Change::Set(_)));

    for (key, change) in changes {
        let result = match change {
            Change::Set(value) => session.insert(&key, value).await,
            Change::Removed => session.remove_value(&key).await.map(drop),
        };
        if let Err(e) = result {
            tracing::error!(error = %e, key, "Failed to persist session change");
        }
    }

    if signed_in && let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to rotate session id");
    }
}

impl<S> FromRequestParts<S> for SessionStore
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self::detached(SessionEvents::new())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use medistore_core::{Role, User, UserId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn user() -> User {
        User {
            id: UserId::new(1),
            name: "Rahim".to_string(),
            email: "rahim@example.com".to_string(),
            role: Role::Customer,
            status: "ACTIVE".to_string(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_changes_round_trip_through_session() {
        let session = session();

        let snapshot = load_snapshot(&session).await.unwrap();
        let store = SessionStore::new(snapshot.clone(), SessionEvents::new());
        assert_eq!(store.user(), None);

        store.set_session("t1", &user()).unwrap();
        write_back(&session, &snapshot).await;

        let reloaded = load_snapshot(&session).await.unwrap();
        let store = SessionStore::new(reloaded, SessionEvents::new());
        assert_eq!(store.user(), Some(user()));
        assert_eq!(
            session.get::<String>(keys::TOKEN).await.unwrap().as_deref(),
            Some("t1")
        );
    }

    #[tokio::test]
    async fn test_clear_is_written_back() {
        let session = session();
        session.insert(keys::TOKEN, "t1").await.unwrap();
        session
            .insert(keys::USER, serde_json::to_string(&user()).unwrap())
            .await
            .unwrap();

        let snapshot = load_snapshot(&session).await.unwrap();
        SessionStore::new(snapshot.clone(), SessionEvents::new()).clear_session();
        write_back(&session, &snapshot).await;

        assert_eq!(session.get::<String>(keys::TOKEN).await.unwrap(), None);
        assert_eq!(session.get::<String>(keys::USER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_extension_gives_detached_store() {
        let (mut parts, ()) = axum::http::Request::new(()).into_parts();
        let store = SessionStore::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(!store.is_attached());
        assert_eq!(store.user(), None);
    }
}
