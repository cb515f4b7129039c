//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, MediStoreClient};
use crate::config::StorefrontConfig;
use crate::services::SubmitGate;
use crate::session::SessionEvents;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the API client, the session event bus, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: MediStoreClient,
    session_events: SessionEvents,
    submit_gate: SubmitGate,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for the MediStore API cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = MediStoreClient::new(&config.api)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                session_events: SessionEvents::new(),
                submit_gate: SubmitGate::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the MediStore API client.
    #[must_use]
    pub fn api(&self) -> &MediStoreClient {
        &self.inner.api
    }

    /// Bus on which session changes are announced.
    #[must_use]
    pub fn session_events(&self) -> &SessionEvents {
        &self.inner.session_events
    }

    #[must_use]
    pub fn submit_gate(&self) -> &SubmitGate {
        &self.inner.submit_gate
    }
}
