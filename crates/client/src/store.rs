//! Process-wide cart item count with change notifications.
//!
//! The store is a single value cell backed by `tokio::sync::watch`:
//! - Readers get the latest value at any time.
//! - Subscribers get the value at subscription time and are woken after
//!   later writes. Writes that land before a subscriber next looks are
//!   coalesced: it observes the latest value, never the ones in between.
//!   The store has no history.
//! - Increments and decrements go through `send_modify`, which applies the
//!   update under the channel's lock, so concurrent writers on a
//!   multi-threaded runtime never lose an update.

use std::sync::Arc;

use reelcart_core::ItemCount;
use tokio::sync::watch;

/// Shared item count, owned by the application root and handed to every
/// surface by reference (clone).
#[derive(Clone, Debug)]
pub struct CartStateStore {
    tx: Arc<watch::Sender<ItemCount>>,
}

impl CartStateStore {
    /// Create a store starting at zero items.
    #[must_use]
    pub fn new() -> Self {
        Self::with_count(ItemCount::ZERO)
    }

    /// Create a store starting at a known count.
    #[must_use]
    pub fn with_count(count: ItemCount) -> Self {
        let (tx, _rx) = watch::channel(count);
        Self { tx: Arc::new(tx) }
    }

    /// Current item count.
    #[must_use]
    pub fn read(&self) -> ItemCount {
        *self.tx.borrow()
    }

    /// Replace the item count. Last write wins.
    pub fn write(&self, count: ItemCount) {
        let previous = self.tx.send_replace(count);
        if previous != count {
            tracing::debug!(previous = %previous, count = %count, "Item count written");
        }
    }

    /// Add one item, returning the new count.
    pub fn increment(&self) -> ItemCount {
        self.update(ItemCount::incremented)
    }

    /// Remove one item (never below zero), returning the new count.
    pub fn decrement(&self) -> ItemCount {
        self.update(ItemCount::decremented)
    }

    /// Set the count back to zero.
    pub fn reset(&self) {
        self.write(ItemCount::ZERO);
    }

    /// Start following the count from its current value.
    ///
    /// The subscription is notified of later writes but only ever sees the
    /// latest count: several writes between two calls to
    /// [`Subscription::changed`] arrive as one change carrying the last value.
    /// Dropping the returned [`Subscription`] unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn update(&self, f: impl FnOnce(ItemCount) -> ItemCount) -> ItemCount {
        let mut updated = ItemCount::ZERO;
        self.tx.send_modify(|count| {
            *count = f(*count);
            updated = *count;
        });
        tracing::debug!(count = %updated, "Item count updated");
        updated
    }
}

impl Default for CartStateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A surface's live view of the item count.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<ItemCount>,
}

impl Subscription {
    /// Latest value, without waiting.
    #[must_use]
    pub fn current(&self) -> ItemCount {
        *self.rx.borrow()
    }

    /// Wait for a write not yet seen and return the current count.
    ///
    /// Returns immediately if writes already happened since the last call;
    /// they are reported once, as the latest value. Returns `None` once the
    /// store has been dropped.
    pub async fn changed(&mut self) -> Option<ItemCount> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Whether a write happened since the last [`changed`](Self::changed).
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(CartStateStore::new().read(), ItemCount::ZERO);
    }

    #[test]
    fn test_last_write_wins() {
        let store = CartStateStore::new();
        store.write(ItemCount::new(4));
        store.write(ItemCount::new(2));
        assert_eq!(store.read(), ItemCount::new(2));
    }

    #[test]
    fn test_decrement_saturates() {
        let store = CartStateStore::new();
        assert_eq!(store.decrement(), ItemCount::ZERO);
        assert_eq!(store.increment(), ItemCount::new(1));
        assert_eq!(store.decrement(), ItemCount::ZERO);
    }

    #[test]
    fn test_clones_share_state() {
        let store = CartStateStore::new();
        let other = store.clone();
        other.increment();
        assert_eq!(store.read(), ItemCount::new(1));
    }

    #[tokio::test]
    async fn test_subscriber_gets_current_then_updates() {
        let store = CartStateStore::with_count(ItemCount::new(3));
        let mut sub = store.subscribe();
        assert_eq!(sub.current(), ItemCount::new(3));
        assert!(!sub.has_changed());

        store.increment();
        assert!(sub.has_changed());
        assert_eq!(sub.changed().await, Some(ItemCount::new(4)));
        assert!(!sub.has_changed());
    }

    #[tokio::test]
    async fn test_writes_between_reads_coalesce_to_latest() {
        let store = CartStateStore::new();
        let mut sub = store.subscribe();

        store.increment();
        store.increment();
        store.write(ItemCount::new(7));

        assert_eq!(sub.changed().await, Some(ItemCount::new(7)));
        assert!(!sub.has_changed());
        let next = tokio::time::timeout(std::time::Duration::from_millis(20), sub.changed()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let store = CartStateStore::new();
        let sub = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
        // Writes with no subscribers still land.
        store.write(ItemCount::new(5));
        assert_eq!(store.read(), ItemCount::new(5));
    }

    #[tokio::test]
    async fn test_changed_ends_when_store_dropped() {
        let store = CartStateStore::new();
        let mut sub = store.subscribe();
        drop(store);
        assert_eq!(sub.changed().await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = CartStateStore::new();
        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.increment();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(store.read(), ItemCount::new(64));
    }
}
