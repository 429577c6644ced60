//! Cart synchronization engine.
//!
//! Every operation is one backend call plus at most one local mutation, and
//! the local mutation happens only after the backend confirms. A failed
//! call leaves the item count, held snapshots and membership exactly as
//! they were.
//!
//! # Cancellation
//!
//! Mutating operations run on a spawned task. If the surface that started
//! one is torn down (its future dropped) the task still finishes, and a
//! successful call still updates the shared [`CartStateStore`]. Surface-owned
//! state (held snapshots, membership) is returned to the caller to apply and
//! simply goes away with a dropped surface.
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = CartSyncEngine::new(HttpCartService::new(&config)?, CartStateStore::new());
//!
//! let mut held = HeldCart::Snapshot(engine.fetch_snapshot().await?);
//! engine.reconcile(held.snapshot().unwrap());
//!
//! let removal = engine.remove_item(MovieId::new(1), held.price_of(MovieId::new(1))).await?;
//! removal.apply_to(&mut held);
//! ```

mod held;
mod operation;

pub use held::{HeldCart, Removal, RemovalOutcome};
pub use operation::OperationState;

use std::future::Future;
use std::sync::Arc;

use reelcart_core::{
    BuyerInfo, CartItem, CartSnapshot, CheckoutTotal, ItemCount, MembershipStatus, MovieId, Price,
};
use tracing::{Instrument, info, instrument};

use crate::error::{CartError, CartOperation, Result, add_breadcrumb};
use crate::remote::{RemoteCartService, RemoteError};
use crate::store::CartStateStore;

/// Orchestrates cart operations against a [`RemoteCartService`] and keeps
/// the shared [`CartStateStore`] in step with confirmed changes.
///
/// Cheap to clone; clones share the backend and the store.
pub struct CartSyncEngine<R> {
    inner: Arc<EngineInner<R>>,
}

struct EngineInner<R> {
    remote: R,
    store: CartStateStore,
}

impl<R> Clone for CartSyncEngine<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> std::fmt::Debug for CartSyncEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSyncEngine")
            .field("count", &self.inner.store.read())
            .finish_non_exhaustive()
    }
}

impl<R: RemoteCartService> CartSyncEngine<R> {
    /// Create an engine over a backend and a shared store.
    #[must_use]
    pub fn new(remote: R, store: CartStateStore) -> Self {
        Self {
            inner: Arc::new(EngineInner { remote, store }),
        }
    }

    /// The shared item count.
    #[must_use]
    pub fn store(&self) -> &CartStateStore {
        &self.inner.store
    }

    /// The backend.
    #[must_use]
    pub fn remote(&self) -> &R {
        &self.inner.remote
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch the cart contents.
    ///
    /// Does not touch the item count; see [`reconcile`](Self::reconcile).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn fetch_snapshot(&self) -> Result<CartSnapshot> {
        let items = self
            .inner
            .remote
            .list()
            .await
            .map_err(|e| fail(CartOperation::FetchSnapshot, e))?;
        Ok(CartSnapshot::from_items(items))
    }

    /// Publish a snapshot's length as the item count, correcting any drift
    /// from changes made elsewhere.
    pub fn reconcile(&self, snapshot: &CartSnapshot) -> ItemCount {
        let count = snapshot.item_count();
        self.inner.store.write(count);
        count
    }

    /// Fetch the contents and publish their count.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; the count is untouched.
    #[instrument(skip(self))]
    pub async fn refresh_count(&self) -> Result<ItemCount> {
        let items = self
            .inner
            .remote
            .list()
            .await
            .map_err(|e| fail(CartOperation::RefreshCount, e))?;
        Ok(self.reconcile(&CartSnapshot::from_items(items)))
    }

    /// Ask the backend whether a movie is in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails. Callers keep whatever
    /// status they had before.
    #[instrument(skip(self), fields(movie_id = %movie_id))]
    pub async fn check_membership(&self, movie_id: MovieId) -> Result<MembershipStatus> {
        self.inner
            .remote
            .status_of(movie_id)
            .await
            .map(MembershipStatus::from_present)
            .map_err(|e| fail(CartOperation::CheckMembership, e))
    }

    /// Fetch the authoritative total for checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn fetch_total(&self) -> Result<CheckoutTotal> {
        self.inner
            .remote
            .total()
            .await
            .map(CheckoutTotal::new)
            .map_err(|e| fail(CartOperation::FetchTotal, e))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item to the cart.
    ///
    /// The count is incremented by exactly one after the backend confirms,
    /// never before. Returns the membership status the caller should now
    /// hold for this item.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; nothing is changed.
    #[instrument(skip(self, item), fields(movie_id = %item.id))]
    pub async fn add_item(&self, item: CartItem) -> Result<MembershipStatus> {
        self.run_detached(CartOperation::AddItem, move |inner| async move {
            inner.remote.add(&item).await?;
            let count = inner.store.increment();
            add_breadcrumb(
                "Item added",
                &[("movie_id", item.id.to_string()), ("count", count.to_string())],
            );
            info!(movie_id = %item.id, count = %count, "Item added to cart");
            Ok::<_, RemoteError>(MembershipStatus::Present)
        })
        .await
    }

    /// Remove an item from the cart.
    ///
    /// `price_of_removed_item` is only used by surfaces that hold a running
    /// total without a snapshot. The returned [`Removal`] must be applied to
    /// the caller's held state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; nothing is changed.
    #[instrument(skip(self), fields(movie_id = %movie_id))]
    pub async fn remove_item(
        &self,
        movie_id: MovieId,
        price_of_removed_item: Option<Price>,
    ) -> Result<Removal> {
        self.run_detached(CartOperation::RemoveItem, move |inner| async move {
            inner.remote.remove(movie_id).await?;
            let count = inner.store.decrement();
            add_breadcrumb(
                "Item removed",
                &[("movie_id", movie_id.to_string()), ("count", count.to_string())],
            );
            info!(movie_id = %movie_id, count = %count, "Item removed from cart");
            Ok::<_, RemoteError>(Removal::new(movie_id, price_of_removed_item))
        })
        .await
    }

    /// Remove every item from the cart.
    ///
    /// On success the count is zero; callers apply
    /// [`HeldCart::apply_empty`] to their own state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; nothing is changed.
    #[instrument(skip(self))]
    pub async fn empty_cart(&self) -> Result<()> {
        self.run_detached(CartOperation::EmptyCart, |inner| async move {
            inner.remote.clear().await?;
            inner.store.reset();
            add_breadcrumb("Cart emptied", &[]);
            info!("Cart emptied");
            Ok::<_, RemoteError>(())
        })
        .await
    }

    /// Complete the purchase. On success the cart is gone and the count is
    /// reset to zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; nothing is changed.
    #[instrument(skip(self, buyer))]
    pub async fn checkout(&self, buyer: BuyerInfo) -> Result<()> {
        self.run_detached(CartOperation::Checkout, move |inner| async move {
            inner.remote.checkout(&buyer).await?;
            inner.store.reset();
            add_breadcrumb("Checkout completed", &[]);
            info!("Checkout completed");
            Ok::<_, RemoteError>(())
        })
        .await
    }

    /// Run a backend call and its store commit on a spawned task so the
    /// commit survives the caller being dropped.
    async fn run_detached<T, F, Fut>(&self, operation: CartOperation, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<EngineInner<R>>) -> Fut,
        Fut: Future<Output = std::result::Result<T, RemoteError>> + Send + 'static,
    {
        let task = tokio::spawn(f(Arc::clone(&self.inner)).instrument(tracing::Span::current()));
        match task.await {
            Ok(result) => result.map_err(|e| fail(operation, e)),
            Err(join_error) => {
                let err = CartError::Aborted {
                    operation,
                    reason: join_error.to_string(),
                };
                err.report();
                Err(err)
            }
        }
    }
}

/// Wrap and report a backend failure at the operation boundary.
fn fail(operation: CartOperation, source: RemoteError) -> CartError {
    let err = CartError::remote(operation, source);
    err.report();
    err
}
