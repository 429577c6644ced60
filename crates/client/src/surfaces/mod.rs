//! Integration contracts for the UI surfaces that read and mutate the cart.
//!
//! Rendering is out of scope; each type here is the state a surface renders
//! from plus the actions its controls trigger:
//!
//! - [`NavBadge`] - item count in the navigation bar
//! - [`CartPage`] - cart listing with remove and empty controls
//! - [`MovieStatusWidget`] - per-movie "add to cart" control
//! - [`CheckoutPanel`] - authoritative total and payment gate
//!
//! Surfaces own their local state behind a mutex that is never held across
//! an `.await`, so a renderer can read loading flags and messages while an
//! operation is in flight. Each action guards itself with an
//! [`OperationState`] and is refused with [`CartError::Busy`] while already
//! running.
//!
//! An action's backend call and the update of the surface's state run
//! together on a spawned task. Dropping the future returned by an action
//! (a timeout, a `select!` branch) does not cancel either: the surface still
//! settles and reflects the outcome once the backend answers.

mod cart_page;
mod checkout;
mod movie_status;
mod nav_badge;

pub use cart_page::CartPage;
pub use checkout::{CheckoutPanel, PAYMENT_COMPLETED_MESSAGE};
pub use movie_status::{ADDED_MESSAGE, ALREADY_IN_CART_MESSAGE, MovieStatusWidget};
pub use nav_badge::NavBadge;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::Instrument;

use crate::engine::OperationState;
use crate::error::{CartError, CartOperation, Result};

/// Message shown when a cart has no items.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty.";

/// Lock surface state, recovering from a poisoned lock.
///
/// Surface state is plain data rewritten wholesale by each action, so a
/// panic mid-update cannot leave it in a state worse than stale.
fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Selects the flag guarding one action within a surface's state.
type FlagOf<S> = fn(&mut S) -> &mut OperationState;

/// Run an action whose flag the caller has already set in flight.
///
/// `call` and `apply` run on a spawned task: once the backend answers, the
/// flag is settled and `apply` folds the result into the surface state,
/// whether or not the caller is still waiting.
async fn run_action<S, T, U, Fut, F>(
    state: &Arc<Mutex<S>>,
    operation: CartOperation,
    flag: FlagOf<S>,
    call: Fut,
    apply: F,
) -> Result<U>
where
    S: Send + 'static,
    U: Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    F: FnOnce(&mut S, Result<T>) -> Result<U> + Send + 'static,
{
    let shared = Arc::clone(state);
    let task = tokio::spawn(
        async move {
            let result = call.await;
            let mut state = lock(&shared);
            flag(&mut state).settle(&result);
            apply(&mut state, result)
        }
        .instrument(tracing::Span::current()),
    );

    match task.await {
        Ok(result) => result,
        Err(join_error) => {
            *flag(&mut lock(state)) = OperationState::RolledBack;
            Err(CartError::Aborted {
                operation,
                reason: join_error.to_string(),
            })
        }
    }
}
