//! Transient notifications ("toasts").
//!
//! A handler queues a toast in the visitor's session and redirects; the next
//! rendered page drains the queue and shows each toast once. Queueing never
//! fails from the caller's point of view: a toast that cannot be stored is
//! logged and dropped.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key holding the pending toasts.
const TOASTS_KEY: &str = "toasts";

/// Upper bound on queued toasts; older ones are dropped first.
const MAX_QUEUED: usize = 8;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

impl ToastLevel {
    /// CSS class suffix used by the templates.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A one-shot message for the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    /// CSS class suffix for the template.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        self.level.as_str()
    }
}

/// Queue a toast for the next rendered page.
pub async fn push_toast(session: &Session, toast: Toast) {
    let mut queued = read_queue(session).await;
    queued.push(toast);
    if queued.len() > MAX_QUEUED {
        let excess = queued.len() - MAX_QUEUED;
        queued.drain(..excess);
    }

    if let Err(e) = session.insert(TOASTS_KEY, queued).await {
        tracing::warn!(error = %e, "Failed to queue notification");
    }
}

/// Remove and return every queued toast, oldest first.
pub async fn take_toasts(session: &Session) -> Vec<Toast> {
    match session.remove::<Vec<Toast>>(TOASTS_KEY).await {
        Ok(toasts) => toasts.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read notifications");
            Vec::new()
        }
    }
}

async fn read_queue(session: &Session) -> Vec<Toast> {
    session
        .get::<Vec<Toast>>(TOASTS_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_toasts_are_shown_once_in_order() {
        let session = session();
        push_toast(&session, Toast::success("Login successful!")).await;
        push_toast(&session, Toast::info("Welcome back")).await;

        assert_eq!(
            take_toasts(&session).await,
            vec![Toast::success("Login successful!"), Toast::info("Welcome back")]
        );
        assert!(take_toasts(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_queue_is_bounded() {
        let session = session();
        for i in 0..(MAX_QUEUED + 3) {
            push_toast(&session, Toast::error(format!("failure {i}"))).await;
        }

        let toasts = take_toasts(&session).await;
        assert_eq!(toasts.len(), MAX_QUEUED);
        assert_eq!(toasts.first().map(|t| t.message.as_str()), Some("failure 3"));
    }

    #[test]
    fn test_toast_class() {
        assert_eq!(Toast::error("x").class(), "error");
        assert_eq!(Toast::success("x").class(), "success");
    }
}
