//! Surface state, busy guards and messages.
//!
//! Run with: cargo test -p reelcart-integration-tests --test surfaces

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use reelcart_client::engine::RemovalOutcome;
use reelcart_client::surfaces::EMPTY_CART_MESSAGE;
use reelcart_client::{CartApp, CartError, CartOperation};
use reelcart_core::{BuyerInfo, ItemCount, MembershipStatus, MovieId, Price};
use reelcart_integration_tests::{FakeCartService, RemoteCall, movie};

fn app(fake: &FakeCartService) -> CartApp<FakeCartService> {
    CartApp::with_remote(fake.clone())
}

fn buyer() -> BuyerInfo {
    BuyerInfo::new("Ada", "Lovelace", "ada@example.com").unwrap()
}

/// Poll until a surface reports no action in flight.
async fn wait_until_idle(busy: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while busy() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

// ============================================================================
// NavBadge
// ============================================================================

#[tokio::test]
async fn test_badge_refresh_publishes_count() {
    let fake = FakeCartService::with_items([movie(1, 999), movie(2, 500)]);
    let app = app(&fake);
    let badge = app.nav_badge();

    assert_eq!(badge.count(), ItemCount::ZERO);
    assert_eq!(badge.refresh().await.unwrap(), ItemCount::new(2));
    assert_eq!(badge.count(), ItemCount::new(2));
    assert!(!badge.is_loading());
    assert_eq!(badge.error(), None);
}

#[tokio::test]
async fn test_badge_follows_adds_from_other_surfaces() {
    let fake = FakeCartService::new();
    let app = app(&fake);
    let mut badge = app.nav_badge();
    let widget = app.movie_status(movie(3, 750));

    widget.add().await.unwrap();

    let count = tokio::time::timeout(Duration::from_secs(1), badge.changed())
        .await
        .unwrap();
    assert_eq!(count, Some(ItemCount::new(1)));
    assert_eq!(badge.count(), ItemCount::new(1));
}

#[tokio::test]
async fn test_badge_refresh_failure_keeps_count() {
    let fake = FakeCartService::with_items([movie(1, 999)]);
    let app = app(&fake);
    let badge = app.nav_badge();
    badge.refresh().await.unwrap();
    fake.fail(RemoteCall::List);

    assert!(badge.refresh().await.is_err());
    assert_eq!(badge.count(), ItemCount::new(1));
    assert_eq!(badge.error(), Some("Error fetching number of items"));
}

// ============================================================================
// CartPage
// ============================================================================

#[tokio::test]
async fn test_cart_page_load_reconciles_count() {
    let fake = FakeCartService::with_items([movie(1, 999), movie(2, 500)]);
    let app = app(&fake);
    let page = app.cart_page();
    assert!(page.is_empty());

    page.load().await.unwrap();

    assert_eq!(page.items(), vec![movie(1, 999), movie(2, 500)]);
    assert_eq!(page.total(), Price::from_cents(1499));
    assert_eq!(app.store().read(), ItemCount::new(2));
    assert!(!page.is_busy());
}

#[tokio::test]
async fn test_cart_page_remove() {
    let fake = FakeCartService::with_items([movie(1, 999), movie(2, 500)]);
    let app = app(&fake);
    let page = app.cart_page();
    page.load().await.unwrap();

    let outcome = page.remove(MovieId::new(1)).await.unwrap();

    assert_eq!(outcome, RemovalOutcome::Rederived(movie(1, 999)));
    assert_eq!(page.items(), vec![movie(2, 500)]);
    assert_eq!(page.total(), Price::from_cents(500));
    assert_eq!(app.store().read(), ItemCount::new(1));
}

#[tokio::test]
async fn test_cart_page_failed_remove_keeps_items() {
    let fake = FakeCartService::with_items([movie(1, 999), movie(2, 500)]);
    let app = app(&fake);
    let page = app.cart_page();
    page.load().await.unwrap();
    fake.fail(RemoteCall::Remove);

    assert!(page.remove(MovieId::new(1)).await.is_err());

    assert_eq!(page.items().len(), 2);
    assert_eq!(page.total(), Price::from_cents(1499));
    assert_eq!(page.error(), Some("Error removing movie from cart"));
    assert_eq!(app.store().read(), ItemCount::new(2));

    // The control stays usable for a retry.
    fake.recover(RemoteCall::Remove);
    page.remove(MovieId::new(1)).await.unwrap();
    assert_eq!(page.error(), None);
    assert_eq!(page.items(), vec![movie(2, 500)]);
}

#[tokio::test]
async fn test_cart_page_empty() {
    let fake = FakeCartService::with_items([movie(1, 999), movie(2, 500)]);
    let app = app(&fake);
    let page = app.cart_page();
    page.load().await.unwrap();

    page.empty().await.unwrap();

    assert!(page.is_empty());
    assert_eq!(page.total(), Price::ZERO);
    assert_eq!(app.store().read(), ItemCount::ZERO);
    assert_eq!(EMPTY_CART_MESSAGE, "Your cart is empty.");
}

#[tokio::test]
async fn test_cart_page_failed_empty_keeps_items() {
    let fake = FakeCartService::with_items([movie(1, 999)]);
    let app = app(&fake);
    let page = app.cart_page();
    page.load().await.unwrap();
    fake.fail(RemoteCall::Clear);

    assert!(page.empty().await.is_err());

    assert_eq!(page.items(), vec![movie(1, 999)]);
    assert_eq!(page.error(), Some("Error emptying the cart"));
    assert_eq!(app.store().read(), ItemCount::new(1));
}

#[tokio::test]
async fn test_cart_page_refuses_overlapping_load() {
    let fake = FakeCartService::with_items([movie(1, 999)]);
    let app = app(&fake);
    let page = Arc::new(app.cart_page());
    fake.close_gate();

    let first = tokio::spawn({
        let page = Arc::clone(&page);
        async move { page.load().await }
    });
    while !page.is_loading() {
        tokio::task::yield_now().await;
    }

    let err = page.load().await.unwrap_err();
    assert!(matches!(err, CartError::Busy(CartOperation::FetchSnapshot)));

    fake.open_gate();
    first.await.unwrap().unwrap();
    assert!(!page.is_loading());
    assert_eq!(fake.call_count(RemoteCall::List), 1);
}

#[tokio::test]
async fn test_timed_out_remove_settles_and_allows_next_remove() {
    let fake = FakeCartService::with_items([movie(1, 999), movie(2, 500)]);
    let app = app(&fake);
    let page = app.cart_page();
    page.load().await.unwrap();
    fake.close_gate();

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), page.remove(MovieId::new(1))).await;
    assert!(abandoned.is_err());
    assert!(page.is_busy());

    fake.open_gate();
    wait_until_idle(|| page.is_busy()).await;
    assert_eq!(page.items(), vec![movie(2, 500)]);
    assert_eq!(page.total(), Price::from_cents(500));

    let outcome = page.remove(MovieId::new(2)).await.unwrap();
    assert_eq!(outcome, RemovalOutcome::Rederived(movie(2, 500)));
    assert!(page.is_empty());
    assert_eq!(app.store().read(), ItemCount::ZERO);
}

#[tokio::test]
async fn test_errors_stay_on_their_surface() {
    let fake = FakeCartService::with_items([movie(1, 999)]);
    let app = app(&fake);
    let page = app.cart_page();
    let badge = app.nav_badge();
    fake.fail(RemoteCall::List);

    assert!(page.load().await.is_err());

    assert_eq!(page.error(), Some("Error fetching cart contents"));
    assert_eq!(badge.error(), None);
}

// ============================================================================
// MovieStatusWidget
// ============================================================================

#[tokio::test]
async fn test_widget_check_and_add() {
    let fake = FakeCartService::new();
    let app = app(&fake);
    let widget = app.movie_status(movie(3, 750));
    assert_eq!(widget.status(), MembershipStatus::Unknown);

    assert_eq!(widget.check().await.unwrap(), MembershipStatus::Absent);
    assert!(widget.can_add());
    assert_eq!(widget.message(), None);

    assert_eq!(widget.add().await.unwrap(), MembershipStatus::Present);
    assert_eq!(widget.status(), MembershipStatus::Present);
    assert_eq!(widget.message(), Some("Movie added"));
    assert!(!widget.can_add());
    assert_eq!(app.store().read(), ItemCount::new(1));
}

#[tokio::test]
async fn test_widget_reports_movie_already_in_cart() {
    let fake = FakeCartService::with_items([movie(3, 750)]);
    let app = app(&fake);
    let widget = app.movie_status(movie(3, 750));

    assert_eq!(widget.check().await.unwrap(), MembershipStatus::Present);
    assert_eq!(widget.message(), Some("Movie already in cart"));
    assert!(!widget.can_add());

    // Adding a present movie does not reach the backend.
    assert_eq!(widget.add().await.unwrap(), MembershipStatus::Present);
    assert_eq!(fake.call_count(RemoteCall::Add), 0);
}

#[tokio::test]
async fn test_widget_failed_add_keeps_status() {
    let fake = FakeCartService::new();
    let app = app(&fake);
    let widget = app.movie_status(movie(3, 750));
    widget.check().await.unwrap();
    fake.fail(RemoteCall::Add);

    assert!(widget.add().await.is_err());

    assert_eq!(widget.status(), MembershipStatus::Absent);
    assert_eq!(widget.message(), Some("Error adding movie to cart."));
    assert!(widget.can_add());
    assert_eq!(app.store().read(), ItemCount::ZERO);
}

#[tokio::test]
async fn test_widget_failed_check_keeps_previous_status() {
    let fake = FakeCartService::new();
    let app = app(&fake);
    let widget = app.movie_status(movie(3, 750));
    widget.check().await.unwrap();
    fake.fail(RemoteCall::StatusOf);

    assert!(widget.check().await.is_err());

    assert_eq!(widget.status(), MembershipStatus::Absent);
    assert_eq!(widget.message(), Some("Error checking movie status"));
}

#[tokio::test]
async fn test_dropped_widget_add_still_updates_badge() {
    let fake = FakeCartService::new();
    let app = app(&fake);
    let mut badge = app.nav_badge();
    fake.close_gate();

    {
        let widget = app.movie_status(movie(8, 1000));
        let abandoned = tokio::time::timeout(Duration::from_millis(20), widget.add()).await;
        assert!(abandoned.is_err());
    }

    fake.open_gate();
    let count = tokio::time::timeout(Duration::from_secs(2), badge.changed())
        .await
        .unwrap();
    assert_eq!(count, Some(ItemCount::new(1)));
}

#[tokio::test]
async fn test_timed_out_add_settles_on_the_same_widget() {
    let fake = FakeCartService::new();
    let app = app(&fake);
    let widget = app.movie_status(movie(8, 1000));
    widget.check().await.unwrap();
    fake.close_gate();

    let abandoned = tokio::time::timeout(Duration::from_millis(20), widget.add()).await;
    assert!(abandoned.is_err());
    assert!(widget.is_busy());

    fake.open_gate();
    wait_until_idle(|| widget.is_busy()).await;
    assert_eq!(widget.status(), MembershipStatus::Present);
    assert_eq!(widget.message(), Some("Movie added"));
    assert!(!widget.can_add());

    // The retry sees the committed add instead of reaching the backend again.
    assert_eq!(widget.add().await.unwrap(), MembershipStatus::Present);
    assert_eq!(widget.check().await.unwrap(), MembershipStatus::Present);
    assert_eq!(fake.call_count(RemoteCall::Add), 1);
    assert_eq!(app.store().read(), ItemCount::new(1));
}

#[tokio::test]
async fn test_timed_out_failed_add_can_be_retried() {
    let fake = FakeCartService::new();
    let app = app(&fake);
    let widget = app.movie_status(movie(8, 1000));
    widget.check().await.unwrap();
    fake.fail(RemoteCall::Add);
    fake.close_gate();

    let abandoned = tokio::time::timeout(Duration::from_millis(20), widget.add()).await;
    assert!(abandoned.is_err());

    fake.open_gate();
    wait_until_idle(|| widget.is_busy()).await;
    assert!(widget.can_add());
    assert_eq!(widget.message(), Some("Error adding movie to cart."));

    fake.recover(RemoteCall::Add);
    assert_eq!(widget.add().await.unwrap(), MembershipStatus::Present);
    assert_eq!(app.store().read(), ItemCount::new(1));
}

// ============================================================================
// CheckoutPanel
// ============================================================================

#[tokio::test]
async fn test_checkout_completes_payment() {
    let fake = FakeCartService::with_items([movie(1, 999), movie(2, 500)]);
    let app = app(&fake);
    app.nav_badge().refresh().await.unwrap();
    let panel = app.checkout();
    assert!(!panel.can_checkout());

    let total = panel.load_total().await.unwrap();
    assert_eq!(total.amount(), Price::from_cents(1499));
    assert!(panel.can_checkout());

    panel.complete_payment(buyer()).await.unwrap();

    assert_eq!(panel.message(), Some("Payment completed successfully"));
    assert_eq!(panel.total(), Some(Price::ZERO));
    assert!(panel.is_empty_cart());
    assert!(!panel.can_checkout());
    assert_eq!(app.store().read(), ItemCount::ZERO);
    assert_eq!(fake.orders().len(), 1);
}

#[tokio::test]
async fn test_checkout_blocked_for_empty_cart() {
    let fake = FakeCartService::new();
    let app = app(&fake);
    let panel = app.checkout();

    panel.load_total().await.unwrap();
    assert!(panel.is_empty_cart());

    let err = panel.complete_payment(buyer()).await.unwrap_err();
    assert!(matches!(err, CartError::CheckoutBlocked));
    assert_eq!(panel.error(), Some("Your cart is empty."));
    assert_eq!(fake.call_count(RemoteCall::Checkout), 0);
}

#[tokio::test]
async fn test_checkout_blocked_before_total_is_known() {
    let fake = FakeCartService::with_items([movie(1, 999)]);
    let app = app(&fake);
    let panel = app.checkout();

    assert!(matches!(
        panel.complete_payment(buyer()).await,
        Err(CartError::CheckoutBlocked)
    ));

    fake.fail(RemoteCall::Total);
    assert!(panel.load_total().await.is_err());
    assert_eq!(panel.total(), None);
    assert_eq!(panel.error(), Some("Error fetching cart total"));
    assert!(!panel.can_checkout());
    assert_eq!(fake.call_count(RemoteCall::Checkout), 0);
}

#[tokio::test]
async fn test_checkout_failure_allows_retry() {
    let fake = FakeCartService::with_items([movie(1, 999)]);
    let app = app(&fake);
    let panel = app.checkout();
    panel.load_total().await.unwrap();
    fake.fail(RemoteCall::Checkout);

    assert!(panel.complete_payment(buyer()).await.is_err());
    assert_eq!(
        panel.error(),
        Some("Error processing payment. Please try again.")
    );
    assert_eq!(panel.total(), Some(Price::from_cents(999)));
    assert!(panel.can_checkout());
    assert_eq!(fake.items().len(), 1);

    fake.recover(RemoteCall::Checkout);
    panel.complete_payment(buyer()).await.unwrap();
    assert_eq!(panel.error(), None);
}
