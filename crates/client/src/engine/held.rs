//! Cart state held locally by one surface, and how confirmed server
//! changes are applied to it.

use reelcart_core::{CartItem, CartSnapshot, MovieId, Price};

/// What a surface holds locally about the cart contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeldCart {
    /// Only the broadcast count is tracked (e.g. a navigation badge).
    #[default]
    Nothing,
    /// A full snapshot; the total is re-derived from it.
    Snapshot(CartSnapshot),
    /// A running total without the items behind it.
    Total(Price),
}

impl HeldCart {
    /// The total this surface would display, if it has one.
    #[must_use]
    pub fn total(&self) -> Option<Price> {
        match self {
            Self::Nothing => None,
            Self::Snapshot(snapshot) => Some(snapshot.total()),
            Self::Total(total) => Some(*total),
        }
    }

    /// The held snapshot, if any.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&CartSnapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Price of an item according to the held snapshot.
    #[must_use]
    pub fn price_of(&self, id: MovieId) -> Option<Price> {
        self.snapshot().and_then(|snapshot| snapshot.price_of(id))
    }

    /// Apply a confirmed removal.
    ///
    /// With a snapshot held, the item is removed by ID and the total is
    /// re-derived; the price hint is not used. With only a total held, the
    /// hint is subtracted (clamped at zero). If the item cannot be resolved
    /// the held state is left exactly as it was.
    pub fn apply_removal(&mut self, id: MovieId, price_hint: Option<Price>) -> RemovalOutcome {
        match self {
            Self::Nothing => RemovalOutcome::NothingHeld,
            Self::Snapshot(snapshot) => snapshot
                .remove(id)
                .map_or(RemovalOutcome::Unresolved, RemovalOutcome::Rederived),
            Self::Total(total) => match price_hint {
                Some(price) => {
                    *total = total.saturating_sub(price);
                    RemovalOutcome::Subtracted(price)
                }
                None => RemovalOutcome::Unresolved,
            },
        }
    }

    /// Apply a confirmed empty-cart: snapshot empty, total zero.
    pub fn apply_empty(&mut self) {
        match self {
            Self::Nothing => {}
            Self::Snapshot(snapshot) => snapshot.clear(),
            Self::Total(total) => *total = Price::ZERO,
        }
    }
}

/// How a confirmed removal was reflected in held state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Removed from the held snapshot; total re-derived.
    Rederived(CartItem),
    /// Only a total was held; the known price was subtracted.
    Subtracted(Price),
    /// The item could not be resolved locally. Held state is unchanged.
    Unresolved,
    /// The surface holds no contents.
    NothingHeld,
}

impl RemovalOutcome {
    /// Whether local bookkeeping could not account for the removal.
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved)
    }
}

/// A removal the server has confirmed, waiting to be applied to a
/// surface's held state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a confirmed removal should be applied to the surface's held cart"]
pub struct Removal {
    movie_id: MovieId,
    price_hint: Option<Price>,
}

impl Removal {
    pub(crate) const fn new(movie_id: MovieId, price_hint: Option<Price>) -> Self {
        Self {
            movie_id,
            price_hint,
        }
    }

    /// The removed movie.
    #[must_use]
    pub const fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    /// Apply to held state, logging when it could not be resolved.
    pub fn apply_to(self, held: &mut HeldCart) -> RemovalOutcome {
        let outcome = held.apply_removal(self.movie_id, self.price_hint);
        if outcome.is_unresolved() {
            tracing::warn!(
                movie_id = %self.movie_id,
                "Removed item not resolvable in held cart; total left unchanged"
            );
        }
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, cents: u32) -> CartItem {
        CartItem::new(MovieId::new(id), Price::from_cents(cents))
    }

    fn held_snapshot() -> HeldCart {
        HeldCart::Snapshot(CartSnapshot::from_items(vec![item(1, 999), item(2, 500)]))
    }

    #[test]
    fn test_snapshot_removal_rederives() {
        let mut held = held_snapshot();
        assert_eq!(held.total(), Some(Price::from_cents(1499)));

        let outcome = held.apply_removal(MovieId::new(1), Some(Price::from_cents(999)));
        assert_eq!(outcome, RemovalOutcome::Rederived(item(1, 999)));
        assert_eq!(held.total(), Some(Price::from_cents(500)));
        assert_eq!(held.snapshot().unwrap().items(), &[item(2, 500)]);
    }

    #[test]
    fn test_snapshot_removal_ignores_wrong_hint() {
        let mut held = held_snapshot();
        // A stale hint must not leak into the total.
        held.apply_removal(MovieId::new(1), Some(Price::from_cents(1)));
        assert_eq!(held.total(), Some(Price::from_cents(500)));
    }

    #[test]
    fn test_missing_item_leaves_snapshot_unchanged() {
        let mut held = held_snapshot();
        let before = held.clone();
        let outcome = Removal::new(MovieId::new(9), Some(Price::from_cents(300))).apply_to(&mut held);
        assert!(outcome.is_unresolved());
        assert_eq!(held, before);
    }

    #[test]
    fn test_total_only_subtracts_hint() {
        let mut held = HeldCart::Total(Price::from_cents(1499));
        let outcome = held.apply_removal(MovieId::new(1), Some(Price::from_cents(999)));
        assert_eq!(outcome, RemovalOutcome::Subtracted(Price::from_cents(999)));
        assert_eq!(held.total(), Some(Price::from_cents(500)));
    }

    #[test]
    fn test_total_only_without_hint_skips_decrement() {
        let mut held = HeldCart::Total(Price::from_cents(1499));
        assert!(held.apply_removal(MovieId::new(1), None).is_unresolved());
        assert_eq!(held.total(), Some(Price::from_cents(1499)));
    }

    #[test]
    fn test_total_never_negative() {
        let mut held = HeldCart::Total(Price::from_cents(100));
        held.apply_removal(MovieId::new(1), Some(Price::from_cents(999)));
        assert_eq!(held.total(), Some(Price::ZERO));
    }

    #[test]
    fn test_apply_empty() {
        let mut held = held_snapshot();
        held.apply_empty();
        assert!(held.snapshot().unwrap().is_empty());
        assert_eq!(held.total(), Some(Price::ZERO));

        let mut held = HeldCart::Total(Price::from_cents(100));
        held.apply_empty();
        assert_eq!(held, HeldCart::Total(Price::ZERO));

        let mut held = HeldCart::Nothing;
        held.apply_empty();
        assert_eq!(held.total(), None);
    }
}
