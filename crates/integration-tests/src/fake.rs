//! In-memory cart backend with failure injection.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reelcart_client::{RemoteCartService, RemoteError};
use reelcart_core::{BuyerInfo, CartItem, CartSnapshot, MovieId, Price};
use tokio::sync::watch;

/// Backend calls, as recorded by [`FakeCartService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCall {
    List,
    Add,
    Remove,
    Clear,
    StatusOf,
    Total,
    Checkout,
}

/// Body of injected failures.
pub const INJECTED_FAILURE: &str = "injected failure";

/// A [`RemoteCartService`] backed by an in-memory cart.
///
/// Clones share the same cart, so a test can keep a handle to inspect and
/// steer the backend after handing it to an engine.
#[derive(Debug, Clone)]
pub struct FakeCartService {
    inner: Arc<FakeInner>,
}

#[derive(Debug)]
struct FakeInner {
    state: Mutex<FakeState>,
    gate: watch::Sender<bool>,
}

#[derive(Debug, Default)]
struct FakeState {
    cart: CartSnapshot,
    failing: HashSet<RemoteCall>,
    calls: Vec<RemoteCall>,
    orders: Vec<(BuyerInfo, Vec<CartItem>)>,
}

impl Default for FakeCartService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCartService {
    /// An empty cart with every call succeeding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FakeInner {
                state: Mutex::new(FakeState::default()),
                gate: watch::Sender::new(true),
            }),
        }
    }

    /// A cart pre-filled with items.
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let fake = Self::new();
        fake.lock().cart = items.into_iter().collect();
        fake
    }

    /// Make every later call of this kind fail with a 500.
    pub fn fail(&self, call: RemoteCall) {
        self.lock().failing.insert(call);
    }

    /// Let calls of this kind succeed again.
    pub fn recover(&self, call: RemoteCall) {
        self.lock().failing.remove(&call);
    }

    /// Hold every call until [`open_gate`](Self::open_gate).
    pub fn close_gate(&self) {
        self.inner.gate.send_replace(false);
    }

    /// Release held calls.
    pub fn open_gate(&self) {
        self.inner.gate.send_replace(true);
    }

    /// Items currently in the cart.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().cart.items().to_vec()
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    /// How many calls of this kind were received.
    #[must_use]
    pub fn call_count(&self, call: RemoteCall) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    /// Completed purchases with the items they paid for.
    #[must_use]
    pub fn orders(&self) -> Vec<(BuyerInfo, Vec<CartItem>)> {
        self.lock().orders.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for the gate, record the call, and fail it if injected.
    async fn enter(&self, call: RemoteCall) -> Result<MutexGuard<'_, FakeState>, RemoteError> {
        let mut gate = self.inner.gate.subscribe();
        // The sender lives in `self`, so the gate can't close underneath us.
        let _ = gate.wait_for(|open| *open).await;

        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(&call) {
            return Err(RemoteError::status(500, INJECTED_FAILURE));
        }
        Ok(state)
    }
}

impl RemoteCartService for FakeCartService {
    async fn list(&self) -> Result<Vec<CartItem>, RemoteError> {
        let state = self.enter(RemoteCall::List).await?;
        Ok(state.cart.items().to_vec())
    }

    async fn add(&self, item: &CartItem) -> Result<(), RemoteError> {
        let mut state = self.enter(RemoteCall::Add).await?;
        state.cart.insert(item.clone());
        Ok(())
    }

    async fn remove(&self, id: MovieId) -> Result<(), RemoteError> {
        let mut state = self.enter(RemoteCall::Remove).await?;
        state.cart.remove(id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        let mut state = self.enter(RemoteCall::Clear).await?;
        state.cart.clear();
        Ok(())
    }

    async fn status_of(&self, id: MovieId) -> Result<bool, RemoteError> {
        let state = self.enter(RemoteCall::StatusOf).await?;
        Ok(state.cart.contains(id))
    }

    async fn total(&self) -> Result<Price, RemoteError> {
        let state = self.enter(RemoteCall::Total).await?;
        Ok(state.cart.total())
    }

    async fn checkout(&self, buyer: &BuyerInfo) -> Result<(), RemoteError> {
        let mut state = self.enter(RemoteCall::Checkout).await?;
        let items = std::mem::take(&mut state.cart).into_items();
        state.orders.push((buyer.clone(), items));
        Ok(())
    }
}
