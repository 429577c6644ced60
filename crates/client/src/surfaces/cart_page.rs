//! Cart listing page.

use std::sync::{Arc, Mutex};

use reelcart_core::{CartItem, CartSnapshot, MovieId, Price};
use tracing::instrument;

use super::{lock, run_action};
use crate::engine::{CartSyncEngine, HeldCart, OperationState, RemovalOutcome};
use crate::error::{CartOperation, Result};
use crate::remote::RemoteCartService;

/// The cart page: lists items with their total and offers remove/empty.
///
/// Holds its own snapshot, which no other surface sees.
#[derive(Debug)]
pub struct CartPage<R> {
    engine: CartSyncEngine<R>,
    state: Arc<Mutex<PageState>>,
}

#[derive(Debug, Default)]
struct PageState {
    held: HeldCart,
    load: OperationState,
    remove: OperationState,
    empty: OperationState,
    error: Option<&'static str>,
}

impl<R: RemoteCartService> CartPage<R> {
    /// Mount an empty page; call [`load`](Self::load) to fill it.
    #[must_use]
    pub fn new(engine: CartSyncEngine<R>) -> Self {
        Self {
            engine,
            state: Arc::default(),
        }
    }

    /// Items currently shown.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        lock(&self.state)
            .held
            .snapshot()
            .map(|snapshot| snapshot.items().to_vec())
            .unwrap_or_default()
    }

    /// Total of the items shown.
    #[must_use]
    pub fn total(&self) -> Price {
        lock(&self.state).held.total().unwrap_or(Price::ZERO)
    }

    /// Whether there is nothing to list (show [`EMPTY_CART_MESSAGE`]).
    ///
    /// [`EMPTY_CART_MESSAGE`]: super::EMPTY_CART_MESSAGE
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.state)
            .held
            .snapshot()
            .is_none_or(CartSnapshot::is_empty)
    }

    /// Whether the initial fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        lock(&self.state).load.is_in_flight()
    }

    /// Whether any action on the page is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        let state = lock(&self.state);
        state.load.is_in_flight() || state.remove.is_in_flight() || state.empty.is_in_flight()
    }

    /// Message from the last failed action.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        lock(&self.state).error
    }

    /// Fetch the cart contents and publish their count.
    ///
    /// # Errors
    ///
    /// Returns an error if a load is already running or the backend call
    /// fails. Previously shown items stay on failure.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<()> {
        lock(&self.state).load.begin(CartOperation::FetchSnapshot)?;

        let engine = self.engine.clone();
        let reconciler = self.engine.clone();
        run_action(
            &self.state,
            CartOperation::FetchSnapshot,
            |state| &mut state.load,
            async move { engine.fetch_snapshot().await },
            move |state, result| match result {
                Ok(snapshot) => {
                    reconciler.reconcile(&snapshot);
                    state.held = HeldCart::Snapshot(snapshot);
                    state.error = None;
                    Ok(())
                }
                Err(e) => {
                    state.error = Some(e.user_message());
                    Err(e)
                }
            },
        )
        .await
    }

    /// Remove one movie.
    ///
    /// # Errors
    ///
    /// Returns an error if a removal is already running or the backend call
    /// fails. Items and total are untouched on failure.
    #[instrument(skip(self), fields(movie_id = %movie_id))]
    pub async fn remove(&self, movie_id: MovieId) -> Result<RemovalOutcome> {
        let price_hint = {
            let mut state = lock(&self.state);
            state.remove.begin(CartOperation::RemoveItem)?;
            state.held.price_of(movie_id)
        };

        let engine = self.engine.clone();
        run_action(
            &self.state,
            CartOperation::RemoveItem,
            |state| &mut state.remove,
            async move { engine.remove_item(movie_id, price_hint).await },
            |state, result| match result {
                Ok(removal) => {
                    state.error = None;
                    Ok(removal.apply_to(&mut state.held))
                }
                Err(e) => {
                    state.error = Some(e.user_message());
                    Err(e)
                }
            },
        )
        .await
    }

    /// Remove every movie.
    ///
    /// # Errors
    ///
    /// Returns an error if emptying is already running or the backend call
    /// fails. Items and total are untouched on failure.
    #[instrument(skip(self))]
    pub async fn empty(&self) -> Result<()> {
        lock(&self.state).empty.begin(CartOperation::EmptyCart)?;

        let engine = self.engine.clone();
        run_action(
            &self.state,
            CartOperation::EmptyCart,
            |state| &mut state.empty,
            async move { engine.empty_cart().await },
            |state, result| match result {
                Ok(()) => {
                    state.held.apply_empty();
                    state.error = None;
                    Ok(())
                }
                Err(e) => {
                    state.error = Some(e.user_message());
                    Err(e)
                }
            },
        )
        .await
    }
}
