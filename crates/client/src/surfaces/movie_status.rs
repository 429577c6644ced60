//! Per-movie "add to cart" control.

use std::sync::{Arc, Mutex};

use reelcart_core::{CartItem, MembershipStatus};
use tracing::instrument;

use super::{lock, run_action};
use crate::engine::{CartSyncEngine, OperationState};
use crate::error::{CartOperation, Result};
use crate::remote::RemoteCartService;

/// Shown once the movie is known to be in the cart.
pub const ALREADY_IN_CART_MESSAGE: &str = "Movie already in cart";

/// Shown after a successful add.
pub const ADDED_MESSAGE: &str = "Movie added";

/// The add-to-cart control on a movie's page.
///
/// Checks membership on mount and disables itself once the movie is in the
/// cart. Its membership status is its own; other surfaces never see it.
#[derive(Debug)]
pub struct MovieStatusWidget<R> {
    engine: CartSyncEngine<R>,
    item: CartItem,
    state: Arc<Mutex<WidgetState>>,
}

#[derive(Debug, Default)]
struct WidgetState {
    status: MembershipStatus,
    check: OperationState,
    add: OperationState,
    message: Option<&'static str>,
}

impl<R: RemoteCartService> MovieStatusWidget<R> {
    /// Mount a widget for one movie. Status starts unknown.
    #[must_use]
    pub fn new(engine: CartSyncEngine<R>, item: CartItem) -> Self {
        Self {
            engine,
            item,
            state: Arc::default(),
        }
    }

    /// The movie this widget adds.
    #[must_use]
    pub const fn item(&self) -> &CartItem {
        &self.item
    }

    /// Membership as last confirmed by the backend.
    #[must_use]
    pub fn status(&self) -> MembershipStatus {
        lock(&self.state).status
    }

    /// Status line to show beside the control.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        lock(&self.state).message
    }

    /// Whether a check or add is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        let state = lock(&self.state);
        state.check.is_in_flight() || state.add.is_in_flight()
    }

    /// Whether the add control should be enabled.
    #[must_use]
    pub fn can_add(&self) -> bool {
        let state = lock(&self.state);
        !state.check.is_in_flight() && !state.add.is_in_flight() && !state.status.is_present()
    }

    /// Ask the backend whether the movie is already in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if a check is already running or the backend call
    /// fails. The previous status is kept on failure.
    #[instrument(skip(self), fields(movie_id = %self.item.id))]
    pub async fn check(&self) -> Result<MembershipStatus> {
        lock(&self.state).check.begin(CartOperation::CheckMembership)?;

        let engine = self.engine.clone();
        let movie_id = self.item.id;
        run_action(
            &self.state,
            CartOperation::CheckMembership,
            |state| &mut state.check,
            async move { engine.check_membership(movie_id).await },
            |state, result| match result {
                Ok(status) => {
                    state.status = status;
                    state.message = status.is_present().then_some(ALREADY_IN_CART_MESSAGE);
                    Ok(status)
                }
                Err(e) => {
                    state.message = Some(e.user_message());
                    Err(e)
                }
            },
        )
        .await
    }

    /// Add the movie to the cart.
    ///
    /// Does nothing when the movie is already known to be present.
    ///
    /// # Errors
    ///
    /// Returns an error if an add is already running or the backend call
    /// fails. Status and the shared count are untouched on failure.
    #[instrument(skip(self), fields(movie_id = %self.item.id))]
    pub async fn add(&self) -> Result<MembershipStatus> {
        {
            let mut state = lock(&self.state);
            if state.status.is_present() {
                return Ok(MembershipStatus::Present);
            }
            state.add.begin(CartOperation::AddItem)?;
        }

        let engine = self.engine.clone();
        let item = self.item.clone();
        run_action(
            &self.state,
            CartOperation::AddItem,
            |state| &mut state.add,
            async move { engine.add_item(item).await },
            |state, result| match result {
                Ok(status) => {
                    state.status = status;
                    state.message = Some(ADDED_MESSAGE);
                    Ok(status)
                }
                Err(e) => {
                    state.message = Some(e.user_message());
                    Err(e)
                }
            },
        )
        .await
    }
}
