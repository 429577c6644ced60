//! Navigation bar item count.

use std::sync::{Arc, Mutex};

use reelcart_core::ItemCount;
use tracing::instrument;

use super::{lock, run_action};
use crate::engine::{CartSyncEngine, OperationState};
use crate::error::{CartOperation, Result};
use crate::remote::RemoteCartService;
use crate::store::Subscription;

/// The cart badge in the navigation bar.
///
/// Subscribed to the shared count for as long as it lives. On mount it
/// refreshes the count from the backend, which is also how drift from other
/// tabs gets corrected.
#[derive(Debug)]
pub struct NavBadge<R> {
    engine: CartSyncEngine<R>,
    subscription: Subscription,
    state: Arc<Mutex<BadgeState>>,
}

#[derive(Debug, Default)]
struct BadgeState {
    refresh: OperationState,
    error: Option<&'static str>,
}

impl<R: RemoteCartService> NavBadge<R> {
    /// Mount a badge, subscribing to the shared count.
    #[must_use]
    pub fn new(engine: CartSyncEngine<R>) -> Self {
        let subscription = engine.store().subscribe();
        Self {
            engine,
            subscription,
            state: Arc::default(),
        }
    }

    /// The count to display.
    #[must_use]
    pub fn count(&self) -> ItemCount {
        self.subscription.current()
    }

    /// Whether a refresh is in flight (show a spinner instead of the count).
    #[must_use]
    pub fn is_loading(&self) -> bool {
        lock(&self.state).refresh.is_in_flight()
    }

    /// Message from the last failed refresh.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        lock(&self.state).error
    }

    /// Wait until the shared count changes and return the latest value.
    ///
    /// Rapid writes are coalesced, so intermediate counts may be skipped.
    /// Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<ItemCount> {
        self.subscription.changed().await
    }

    /// Re-read the cart from the backend and publish its size.
    ///
    /// # Errors
    ///
    /// Returns an error if a refresh is already running or the backend
    /// call fails. The count is left as it was on failure.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<ItemCount> {
        lock(&self.state).refresh.begin(CartOperation::RefreshCount)?;

        let engine = self.engine.clone();
        run_action(
            &self.state,
            CartOperation::RefreshCount,
            |state| &mut state.refresh,
            async move { engine.refresh_count().await },
            |state, result| {
                state.error = result.as_ref().err().map(|e| e.user_message());
                result
            },
        )
        .await
    }
}
