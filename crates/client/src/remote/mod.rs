//! The authoritative cart backend.
//!
//! # Architecture
//!
//! - [`RemoteCartService`] is the only seam between the sync core and the
//!   server. The engine is generic over it, so tests swap in an in-memory
//!   backend and the CLI uses [`HttpCartService`].
//! - The backend is the source of truth. Nothing here caches: every call is
//!   a direct round trip.
//! - Any non-2xx status or transport failure is a [`RemoteError`]; callers
//!   never branch on specific status codes.

mod http;

pub use http::{HttpCartService, REQUEST_ID_HEADER};

use std::future::Future;

use reelcart_core::{BuyerInfo, CartItem, MovieId, Price};
use thiserror::Error;

/// Errors that can occur when talking to the cart backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failed (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request could not be built (e.g. bad URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteError {
    /// Build a status error from a code and a (possibly long) response body.
    #[must_use]
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            message: body.chars().take(200).collect(),
        }
    }
}

/// Operations exposed by the cart backend.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`); mutating engine
///   operations run the call on a spawned task.
/// - A call either succeeds completely or returns an error. The engine only
///   touches local state after `Ok`.
pub trait RemoteCartService: Send + Sync + 'static {
    /// List the cart contents in server order.
    fn list(&self) -> impl Future<Output = Result<Vec<CartItem>, RemoteError>> + Send;

    /// Add an item, sending the full payload.
    fn add(&self, item: &CartItem) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Remove the item with this ID.
    fn remove(&self, id: MovieId) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Remove every item.
    fn clear(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Whether the item with this ID is in the cart.
    fn status_of(&self, id: MovieId) -> impl Future<Output = Result<bool, RemoteError>> + Send;

    /// The server-computed cart total.
    fn total(&self) -> impl Future<Output = Result<Price, RemoteError>> + Send;

    /// Complete the purchase for this buyer.
    fn checkout(&self, buyer: &BuyerInfo)
    -> impl Future<Output = Result<(), RemoteError>> + Send;
}
