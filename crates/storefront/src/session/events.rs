//! Typed session-change notifications.

use tokio::sync::broadcast;

use medistore_core::User;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Something changed about a visitor's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A token and user were stored after a successful login.
    SignedIn { user: User },
    /// The cached user was replaced (e.g. after a profile update).
    UserUpdated { user: User },
    /// The session was cleared.
    SignedOut,
}

/// Publish/subscribe channel for [`SessionEvent`]s.
///
/// One bus is shared by the whole application; every request-scoped
/// `SessionStore` publishes to it.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    /// Create a new event bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is fine.
    pub fn publish(&self, event: SessionEvent) {
        // `send` only fails when nobody is listening.
        let _ = self.sender.send(event);
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

/// Log every session change until the bus is dropped.
///
/// Spawned once at startup; gives an audit trail of logins and logouts.
pub async fn log_session_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::SignedIn { user }) => {
                tracing::info!(user_id = %user.id, role = %user.role, "Session started");
            }
            Ok(SessionEvent::UserUpdated { user }) => {
                tracing::info!(user_id = %user.id, "Session user refreshed");
            }
            Ok(SessionEvent::SignedOut) => {
                tracing::info!("Session cleared");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Session event log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
