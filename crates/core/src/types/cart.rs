//! Cart items, snapshots and the broadcast item count.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{MovieId, Price};

/// One movie held in the cart.
///
/// Only `id` and `price` mean anything to the cart logic; the rest is display
/// metadata carried through untouched. Instances are never assumed to be
/// stable across fetches: two fetches yield distinct values for the same
/// logical item, compared by [`CartItem::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub release_date: String,
    pub price: Price,
}

impl CartItem {
    /// Create an item with no display metadata.
    #[must_use]
    pub fn new(id: MovieId, price: Price) -> Self {
        Self {
            id,
            title: String::new(),
            image: String::new(),
            release_date: String::new(),
            price,
        }
    }

    /// Attach a title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Attach a poster image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Attach a release date, kept verbatim.
    #[must_use]
    pub fn with_release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = release_date.into();
        self
    }
}

/// The full contents of a cart at one point in time.
///
/// IDs are unique within a snapshot. The total is always derived from the
/// items and never stored, so it cannot drift from them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    items: Vec<CartItem>,
}

impl CartSnapshot {
    /// An empty snapshot.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a snapshot, keeping the first occurrence of any repeated ID.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut snapshot = Self::empty();
        for item in items {
            snapshot.insert(item);
        }
        snapshot
    }

    /// Items in the order the backend returned them.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the snapshot holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item prices, recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Item count as broadcast to surfaces.
    #[must_use]
    pub fn item_count(&self) -> ItemCount {
        ItemCount::from_len(self.items.len())
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn get(&self, id: MovieId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether an item with this ID is held.
    #[must_use]
    pub fn contains(&self, id: MovieId) -> bool {
        self.get(id).is_some()
    }

    /// Price of the item with this ID, if held.
    #[must_use]
    pub fn price_of(&self, id: MovieId) -> Option<Price> {
        self.get(id).map(|item| item.price)
    }

    /// Add an item. Returns `false` (and leaves the snapshot alone) if the
    /// ID is already present.
    pub fn insert(&mut self, item: CartItem) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the item with this ID, returning it if it was held.
    pub fn remove(&mut self, id: MovieId) -> Option<CartItem> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Drop every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Consume the snapshot, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

impl<'de> Deserialize<'de> for CartSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<CartItem>::deserialize(deserializer).map(Self::from_items)
    }
}

impl FromIterator<CartItem> for CartSnapshot {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}

/// Number of items in the cart, as broadcast to every surface.
///
/// Never negative: decrementing zero stays at zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemCount(u32);

impl ItemCount {
    /// Zero items.
    pub const ZERO: Self = Self(0);

    /// Create a count.
    #[must_use]
    pub const fn new(count: u32) -> Self {
        Self(count)
    }

    /// Count from a collection length, saturating at `u32::MAX`.
    #[must_use]
    pub fn from_len(len: usize) -> Self {
        Self(u32::try_from(len).unwrap_or(u32::MAX))
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// One more item.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One fewer item, never below zero.
    #[must_use]
    pub const fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Whether the count is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ItemCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ItemCount {
    fn from(count: u32) -> Self {
        Self(count)
    }
}
