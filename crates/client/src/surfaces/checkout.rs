//! Checkout total and payment.

use std::sync::{Arc, Mutex};

use reelcart_core::{BuyerInfo, CheckoutTotal, Price};
use tracing::instrument;

use super::{lock, run_action};
use crate::engine::{CartSyncEngine, OperationState};
use crate::error::{CartError, CartOperation, Result};
use crate::remote::RemoteCartService;

/// Shown after the backend accepts a payment.
pub const PAYMENT_COMPLETED_MESSAGE: &str = "Payment completed successfully";

/// The checkout panel.
///
/// Reads the total from the backend, never from the shared count or another
/// surface's snapshot. Payment is only offered for a known, non-zero total.
#[derive(Debug)]
pub struct CheckoutPanel<R> {
    engine: CartSyncEngine<R>,
    state: Arc<Mutex<PanelState>>,
}

#[derive(Debug, Default)]
struct PanelState {
    total: Option<CheckoutTotal>,
    load: OperationState,
    pay: OperationState,
    error: Option<&'static str>,
    message: Option<&'static str>,
}

impl PanelState {
    fn gate_open(&self) -> bool {
        self.total.is_some_and(|total| total.allows_checkout())
    }
}

impl<R: RemoteCartService> CheckoutPanel<R> {
    /// Mount a panel; the total is unknown until [`load_total`](Self::load_total).
    #[must_use]
    pub fn new(engine: CartSyncEngine<R>) -> Self {
        Self {
            engine,
            state: Arc::default(),
        }
    }

    /// The authoritative total, once fetched.
    #[must_use]
    pub fn total(&self) -> Option<Price> {
        lock(&self.state).total.map(|total| total.amount())
    }

    /// Whether the fetched total says the cart is empty.
    #[must_use]
    pub fn is_empty_cart(&self) -> bool {
        lock(&self.state)
            .total
            .is_some_and(|total| total.is_empty_cart())
    }

    /// Whether the payment form should be offered.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        let state = lock(&self.state);
        !state.pay.is_in_flight() && state.gate_open()
    }

    /// Whether the total is being fetched or a payment is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        let state = lock(&self.state);
        state.load.is_in_flight() || state.pay.is_in_flight()
    }

    /// Message from the last failed action.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        lock(&self.state).error
    }

    /// Confirmation from the last successful payment.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        lock(&self.state).message
    }

    /// Fetch the authoritative total and open or close the gate.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch is already running or the backend call
    /// fails. The total becomes unknown and the gate closes on failure.
    #[instrument(skip(self))]
    pub async fn load_total(&self) -> Result<CheckoutTotal> {
        lock(&self.state).load.begin(CartOperation::FetchTotal)?;

        let engine = self.engine.clone();
        run_action(
            &self.state,
            CartOperation::FetchTotal,
            |state| &mut state.load,
            async move { engine.fetch_total().await },
            |state, result| match result {
                Ok(total) => {
                    state.total = Some(total);
                    state.error = None;
                    Ok(total)
                }
                Err(e) => {
                    state.total = None;
                    state.error = Some(e.user_message());
                    Err(e)
                }
            },
        )
        .await
    }

    /// Submit payment for the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CheckoutBlocked`] without calling the backend
    /// unless a non-zero total has been loaded. Otherwise returns an error if
    /// a payment is already running or the backend call fails, in which case
    /// the total and the gate stay as they were so the buyer can retry.
    #[instrument(skip(self, buyer))]
    pub async fn complete_payment(&self, buyer: BuyerInfo) -> Result<()> {
        {
            let mut state = lock(&self.state);
            state.pay.begin(CartOperation::Checkout)?;
            if !state.gate_open() {
                state.pay = OperationState::RolledBack;
                state.error = Some(CartError::CheckoutBlocked.user_message());
                return Err(CartError::CheckoutBlocked);
            }
            state.message = None;
        }

        let engine = self.engine.clone();
        run_action(
            &self.state,
            CartOperation::Checkout,
            |state| &mut state.pay,
            async move { engine.checkout(buyer).await },
            |state, result| match result {
                Ok(()) => {
                    state.total = Some(CheckoutTotal::new(Price::ZERO));
                    state.error = None;
                    state.message = Some(PAYMENT_COMPLETED_MESSAGE);
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
