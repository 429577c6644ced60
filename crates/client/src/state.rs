//! Application state shared by every mounted surface.

use std::sync::Arc;

use reelcart_core::CartItem;

use crate::config::ClientConfig;
use crate::engine::CartSyncEngine;
use crate::remote::{HttpCartService, RemoteCartService, RemoteError};
use crate::store::CartStateStore;
use crate::surfaces::{CartPage, CheckoutPanel, MovieStatusWidget, NavBadge};

/// The cart application: one backend, one shared item count, and any number
/// of surfaces mounted against them.
///
/// Cheap to clone via `Arc`; clones share the same store.
pub struct CartApp<R> {
    inner: Arc<CartAppInner<R>>,
}

struct CartAppInner<R> {
    config: Option<ClientConfig>,
    engine: CartSyncEngine<R>,
}

impl<R> Clone for CartApp<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> std::fmt::Debug for CartApp<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartApp")
            .field("config", &self.inner.config)
            .field("engine", &self.inner.engine)
            .finish()
    }
}

impl CartApp<HttpCartService> {
    /// Create an application talking to the configured REST backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built from the config.
    pub fn connect(config: ClientConfig) -> Result<Self, RemoteError> {
        let remote = HttpCartService::new(&config)?;
        Ok(Self {
            inner: Arc::new(CartAppInner {
                config: Some(config),
                engine: CartSyncEngine::new(remote, CartStateStore::new()),
            }),
        })
    }
}

impl<R: RemoteCartService> CartApp<R> {
    /// Create an application over any backend, with a fresh store.
    #[must_use]
    pub fn with_remote(remote: R) -> Self {
        Self {
            inner: Arc::new(CartAppInner {
                config: None,
                engine: CartSyncEngine::new(remote, CartStateStore::new()),
            }),
        }
    }

    /// The configuration this app was connected with, if any.
    #[must_use]
    pub fn config(&self) -> Option<&ClientConfig> {
        self.inner.config.as_ref()
    }

    /// The engine shared by all surfaces.
    #[must_use]
    pub fn engine(&self) -> &CartSyncEngine<R> {
        &self.inner.engine
    }

    /// The shared item count.
    #[must_use]
    pub fn store(&self) -> &CartStateStore {
        self.inner.engine.store()
    }

    /// Mount a navigation badge.
    #[must_use]
    pub fn nav_badge(&self) -> NavBadge<R> {
        NavBadge::new(self.inner.engine.clone())
    }

    /// Mount a cart page.
    #[must_use]
    pub fn cart_page(&self) -> CartPage<R> {
        CartPage::new(self.inner.engine.clone())
    }

    /// Mount an add-to-cart widget for one movie.
    #[must_use]
    pub fn movie_status(&self, item: CartItem) -> MovieStatusWidget<R> {
        MovieStatusWidget::new(self.inner.engine.clone(), item)
    }

    /// Mount a checkout panel.
    #[must_use]
    pub fn checkout(&self) -> CheckoutPanel<R> {
        CheckoutPanel::new(self.inner.engine.clone())
    }
}
