//! The session store: token and cached user for one visitor.

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::broadcast;

use medistore_core::User;

use super::events::{SessionEvent, SessionEvents};
use super::storage::SessionStorage;

/// Storage keys used by the session store.
pub mod keys {
    /// Key for the opaque API token.
    pub const TOKEN: &str = "token";

    /// Key for the JSON-encoded cached user.
    pub const USER: &str = "user";
}

/// Value some clients write when they serialise a missing user.
const UNDEFINED: &str = "undefined";

/// Errors from session writes. Reads never fail.
#[derive(Debug, Error)]
pub enum SessionError {
    /// There is no storage backend to write to.
    #[error("no session storage available")]
    NoStorage,

    /// The user could not be encoded.
    #[error("failed to encode session user: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Explicit session context handed to handlers and controllers.
///
/// Wraps a single [`SessionStorage`] adapter; nothing else in the crate reads
/// or writes the `token`/`user` keys. Writes publish a [`SessionEvent`] so the
/// rest of the application can react without polling.
///
/// A *detached* store has no storage at all: every read returns `None` and
/// every write fails with [`SessionError::NoStorage`].
#[derive(Clone)]
pub struct SessionStore {
    storage: Option<Arc<dyn SessionStorage>>,
    events: SessionEvents,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("attached", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store over `storage`, publishing to `events`.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>, events: SessionEvents) -> Self {
        Self {
            storage: Some(storage),
            events,
        }
    }

    /// Create a store with no storage backend.
    #[must_use]
    pub const fn detached(events: SessionEvents) -> Self {
        Self {
            storage: None,
            events,
        }
    }

    /// Whether a storage backend is attached.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.storage.is_some()
    }

    /// Persist a freshly issued token and its user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoStorage` on a detached store, or
    /// `SessionError::Encode` if the user cannot be encoded. Nothing is
    /// written in either case.
    pub fn set_session(&self, token: &str, user: &User) -> Result<(), SessionError> {
        let storage = self.storage()?;
        let encoded = serde_json::to_string(user)?;

        storage.set_item(keys::TOKEN, token.to_string());
        storage.set_item(keys::USER, encoded);

        self.events.publish(SessionEvent::SignedIn { user: user.clone() });
        Ok(())
    }

    /// Replace the cached user, keeping the token.
    ///
    /// # Errors
    ///
    /// Same as [`set_session`](Self::set_session).
    pub fn update_user(&self, user: &User) -> Result<(), SessionError> {
        let storage = self.storage()?;
        storage.set_item(keys::USER, serde_json::to_string(user)?);

        self.events
            .publish(SessionEvent::UserUpdated { user: user.clone() });
        Ok(())
    }

    /// Remove the token and the cached user.
    ///
    /// On a detached store there is nothing to clear; the sign-out event is
    /// still published.
    pub fn clear_session(&self) {
        if let Some(storage) = &self.storage {
            storage.remove_item(keys::TOKEN);
            storage.remove_item(keys::USER);
        }
        self.events.publish(SessionEvent::SignedOut);
    }

    /// The cached user, if there is a usable one.
    ///
    /// Absent, `"undefined"`, and undecodable values all mean "no session".
    #[must_use]
    pub fn user(&self) -> Option<User> {
        let raw = self.storage.as_ref()?.get_item(keys::USER)?;
        if raw.trim().is_empty() || raw == UNDEFINED {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring undecodable session user");
                None
            }
        }
    }

    /// The API token, if one is stored.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.storage
            .as_ref()?
            .get_item(keys::TOKEN)
            .filter(|t| !t.is_empty() && t != UNDEFINED)
            .map(SecretString::from)
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn storage(&self) -> Result<&Arc<dyn SessionStorage>, SessionError> {
        self.storage.as_ref().ok_or(SessionError::NoStorage)
    }
}
