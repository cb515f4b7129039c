//! HTTP client for the MediStore API.

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use medistore_core::{CartItem, Order, User};

use super::types::{LoginRequest, LoginResponse, ProfileUpdate, RegisterRequest, ReviewRequest};
use super::{ApiError, extract_message};
use crate::config::ApiConfig;

const LOGIN: &str = "auth/login";
const REGISTER: &str = "auth/register";
const ME: &str = "auth/me";
const CART: &str = "cart";
const ORDERS: &str = "orders";
const REVIEWS: &str = "reviews";

/// Client for the MediStore REST API.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct MediStoreClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MediStoreClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("medistore-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Exchange credentials for a token and the account record.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response = self.send(Method::POST, LOGIN, None, Some(credentials)).await?;
        decode(response).await
    }

    /// Create a new account. The response body is not used.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the registration.
    #[instrument(skip(self, registration), fields(email = %registration.email, role = %registration.role))]
    pub async fn register(&self, registration: &RegisterRequest) -> Result<(), ApiError> {
        self.send(Method::POST, REGISTER, None, Some(registration))
            .await
            .map(drop)
    }

    /// Client that attaches the visitor's token to every request.
    ///
    /// With no token the requests go out anonymously and the API decides what
    /// to do with them (usually a 401).
    #[must_use]
    pub const fn authorized<'a>(&'a self, token: Option<&'a SecretString>) -> AuthorizedClient<'a> {
        AuthorizedClient {
            client: self,
            token,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder, ApiError> {
        let builder = self.http.request(method, self.endpoint(path)?);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let mut builder = self.request(method, path, token)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_message(&body);
            tracing::debug!(status = status.as_u16(), ?message, path, "API request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

/// Token-bearing view of [`MediStoreClient`] for account-scoped endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizedClient<'a> {
    client: &'a MediStoreClient,
    token: Option<&'a SecretString>,
}

impl AuthorizedClient<'_> {
    /// Fetch the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a user.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get(ME).await
    }

    /// Update name, email, and avatar of the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the update.
    #[instrument(skip(self, update))]
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let response = self
            .client
            .send(Method::PUT, ME, self.token, Some(update))
            .await?;
        decode(response).await
    }

    /// Fetch the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a list of items.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Vec<CartItem>, ApiError> {
        self.get(CART).await
    }

    /// Fetch the visitor's order history.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a list of orders.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(ORDERS).await
    }

    /// Submit a review for a delivered order. The response body is not used.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the review.
    #[instrument(skip(self, review), fields(order_id = %review.order_id, rating = review.rating))]
    pub async fn create_review(&self, review: &ReviewRequest) -> Result<(), ApiError> {
        self.client
            .send(Method::POST, REVIEWS, self.token, Some(review))
            .await
            .map(drop)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .send::<()>(Method::GET, path, self.token, None)
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> MediStoreClient {
        MediStoreClient::new(&ApiConfig::new(base, Duration::from_secs(5)).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let client = client("http://localhost:5000/api");
        assert_eq!(
            client.endpoint(LOGIN).unwrap().as_str(),
            "http://localhost:5000/api/auth/login"
        );
        assert_eq!(
            client.endpoint("/orders").unwrap().as_str(),
            "http://localhost:5000/api/orders"
        );
    }

    #[test]
    fn test_request_attaches_bearer_token() {
        let client = client("http://localhost:5000");
        let token = SecretString::from("t1");

        let request = client
            .request(Method::GET, ME, Some(&token))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer t1"
        );

        let anonymous = client.request(Method::GET, ME, None).unwrap().build().unwrap();
        assert!(anonymous.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }
}
