//! REST implementation of [`RemoteCartService`] using `reqwest`.

use std::sync::Arc;

use reelcart_core::{BuyerInfo, CartItem, MovieId, Price};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use super::{RemoteCartService, RemoteError};
use crate::config::ClientConfig;

/// Header carrying a per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const CART_PATH: &str = "cart";
const ADD_PATH: &str = "cart/add";
const REMOVE_PATH: &str = "cart/remove";
const EMPTY_PATH: &str = "cart/empty";
const STATUS_PATH: &str = "cart/status";
const TOTAL_PATH: &str = "cart/total";
const COMPLETE_PATH: &str = "cart/complete";

/// Client for the cart REST backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpCartService {
    inner: Arc<HttpCartServiceInner>,
}

struct HttpCartServiceInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpCartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCartService")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpCartService {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| RemoteError::InvalidRequest(format!("Invalid API token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpCartServiceInner {
                client,
                base_url: with_trailing_slash(config.api_url.clone()),
            }),
        })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a request for a path relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RemoteError> {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| RemoteError::InvalidRequest(format!("{path}: {e}")))?;

        Ok(self
            .inner
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string()))
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, RemoteError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Cart backend returned non-success status"
            );
            return Err(RemoteError::status(status.as_u16(), &body));
        }

        Ok(body)
    }

    /// Send a request and parse a JSON response body.
    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse cart backend response"
            );
            RemoteError::Parse(e)
        })
    }
}

impl RemoteCartService for HttpCartService {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<CartItem>, RemoteError> {
        let items: Vec<CartItem> = self
            .execute_json(self.request(Method::GET, CART_PATH)?)
            .await?;
        debug!(count = items.len(), "Fetched cart contents");
        Ok(items)
    }

    #[instrument(skip(self, item), fields(movie_id = %item.id))]
    async fn add(&self, item: &CartItem) -> Result<(), RemoteError> {
        let request = self.request(Method::POST, ADD_PATH)?.json(item);
        self.execute(request).await.map(drop)
    }

    #[instrument(skip(self), fields(movie_id = %id))]
    async fn remove(&self, id: MovieId) -> Result<(), RemoteError> {
        let path = format!("{REMOVE_PATH}/{id}");
        self.execute(self.request(Method::DELETE, &path)?)
            .await
            .map(drop)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), RemoteError> {
        self.execute(self.request(Method::DELETE, EMPTY_PATH)?)
            .await
            .map(drop)
    }

    #[instrument(skip(self), fields(movie_id = %id))]
    async fn status_of(&self, id: MovieId) -> Result<bool, RemoteError> {
        let path = format!("{STATUS_PATH}/{id}");
        self.execute_json(self.request(Method::GET, &path)?).await
    }

    #[instrument(skip(self))]
    async fn total(&self) -> Result<Price, RemoteError> {
        self.execute_json(self.request(Method::GET, TOTAL_PATH)?)
            .await
    }

    #[instrument(skip(self, buyer))]
    async fn checkout(&self, buyer: &BuyerInfo) -> Result<(), RemoteError> {
        let request = self.request(Method::POST, COMPLETE_PATH)?.json(buyer);
        self.execute(request).await.map(drop)
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
