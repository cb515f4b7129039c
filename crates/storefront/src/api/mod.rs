//! MediStore REST API client.
//!
//! The storefront never stores catalogue, cart, or order data itself; every
//! read and write goes through this client.
//!
//! # Endpoints
//!
//! ```text
//! POST /auth/login      {email, password}                -> {token, user}
//! POST /auth/register   {name, email, password, role}    -> (ignored)
//! GET  /auth/me                                          -> User
//! PUT  /auth/me         {name, email, avatar}            -> User
//! GET  /cart                                             -> CartItem[]
//! GET  /orders                                           -> Order[]
//! POST /reviews         {orderId, rating, comment}       -> (ignored)
//! ```

mod client;
pub mod types;

pub use client::{AuthorizedClient, MediStoreClient};
pub use types::{LoginRequest, LoginResponse, ProfileUpdate, RegisterRequest, ReviewRequest};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the MediStore API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("API error: {status}{}", .message.as_deref().map(|m| format!(" - {m}")).unwrap_or_default())]
    Status {
        status: u16,
        /// The `message` field of the JSON error body, when there was one.
        message: Option<String>,
    },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// The message the API put in its error body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// The API's own message, or `fallback` when it did not send one.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }
}

/// Conventional `{ "message": "..." }` error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull a non-empty `message` out of an error body, ignoring anything else.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(extract_message(r#"{"message":"  "}"#), None);
        assert_eq!(extract_message(r#"{"error":"nope"}"#), None);
        assert_eq!(extract_message("<html>502 Bad Gateway</html>"), None);
        assert_eq!(extract_message(""), None);
    }

    #[test]
    fn test_message_or_prefers_server_message() {
        let err = ApiError::Status {
            status: 401,
            message: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.message_or("Login failed. Try again!"), "Invalid credentials");
    }

    #[test]
    fn test_message_or_falls_back() {
        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.message_or("Update failed"), "Update failed");

        let err = ApiError::Parse("expected array".to_string());
        assert_eq!(err.message_or("Failed to load profile"), "Failed to load profile");
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: 409,
            message: Some("Email already registered".to_string()),
        };
        assert_eq!(err.to_string(), "API error: 409 - Email already registered");

        let err = ApiError::Status {
            status: 503,
            message: None,
        };
        assert_eq!(err.to_string(), "API error: 503");
    }
}
