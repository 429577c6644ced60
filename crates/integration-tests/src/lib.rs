//! Integration tests for ReelCart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p reelcart-integration-tests
//! ```
//!
//! Nothing external is needed: engine and surface scenarios run against
//! [`FakeCartService`], and the REST client is exercised end-to-end against
//! [`MockBackend`], an axum server on an ephemeral local port.
//!
//! # Test Categories
//!
//! - `engine` - Sync engine properties (no optimistic updates, conservation)
//! - `surfaces` - Per-surface state, busy guards and messages
//! - `http_client` - Wire contract of `HttpCartService`

pub mod fake;
pub mod server;

pub use fake::{FakeCartService, INJECTED_FAILURE, RemoteCall};
pub use server::{MockBackend, RecordedRequest};

use reelcart_core::{CartItem, MovieId, Price};

/// A movie priced in cents, with a title derived from its ID.
#[must_use]
pub fn movie(id: i64, cents: u32) -> CartItem {
    CartItem::new(MovieId::new(id), Price::from_cents(cents)).with_title(format!("Movie {id}"))
}
