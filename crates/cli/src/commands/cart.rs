//! Cart listing and mutation commands.
//!
//! # Usage
//!
//! ```bash
//! reelcart list
//! reelcart count
//! reelcart status 3
//! reelcart add --id 3 --title "Heat" --price 7.50 --release-date 1995-12-15
//! reelcart remove 3
//! reelcart empty
//! ```

use reelcart_client::engine::RemovalOutcome;
use reelcart_client::surfaces::EMPTY_CART_MESSAGE;
use reelcart_client::{CartApp, HttpCartService};
use reelcart_core::{CartItem, MovieId, Price};
use tracing::info;

use super::CommandError;

type App = CartApp<HttpCartService>;

/// Print every item in the cart and the total.
///
/// # Errors
///
/// Returns an error if the cart cannot be fetched.
pub async fn list(app: &App) -> Result<(), CommandError> {
    let page = app.cart_page();
    page.load().await?;

    if page.is_empty() {
        info!("{EMPTY_CART_MESSAGE}");
        return Ok(());
    }

    for item in page.items() {
        info!(
            movie_id = %item.id,
            price = %item.price,
            release_date = %item.release_date,
            "{}",
            item.title
        );
    }
    info!(count = %app.store().read(), total = %page.total(), "Cart total");
    Ok(())
}

/// Print the number of items in the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be fetched.
pub async fn count(app: &App) -> Result<(), CommandError> {
    let badge = app.nav_badge();
    let count = badge.refresh().await?;
    info!(count = %count, "Items in cart");
    Ok(())
}

/// Print whether a movie is in the cart.
///
/// # Errors
///
/// Returns an error if the status cannot be fetched.
pub async fn status(app: &App, movie_id: MovieId) -> Result<(), CommandError> {
    let widget = app.movie_status(CartItem::new(movie_id, Price::ZERO));
    let status = widget.check().await?;
    info!(movie_id = %movie_id, status = %status, "Movie status");
    Ok(())
}

/// Add a movie, unless it is already in the cart.
///
/// # Errors
///
/// Returns an error if the status check or the add fails.
pub async fn add(
    app: &App,
    movie_id: MovieId,
    title: String,
    price: Price,
    image: Option<String>,
    release_date: Option<String>,
) -> Result<(), CommandError> {
    let mut item = CartItem::new(movie_id, price).with_title(title);
    if let Some(image) = image {
        item = item.with_image(image);
    }
    if let Some(release_date) = release_date {
        item = item.with_release_date(release_date);
    }

    let widget = app.movie_status(item);
    widget.check().await?;
    if !widget.can_add() {
        if let Some(message) = widget.message() {
            info!(movie_id = %movie_id, "{message}");
        }
        return Ok(());
    }

    widget.add().await?;
    info!(
        movie_id = %movie_id,
        count = %app.store().read(),
        "{}",
        widget.message().unwrap_or_default()
    );
    Ok(())
}

/// Remove a movie and print the new total.
///
/// # Errors
///
/// Returns an error if the cart cannot be fetched or the removal fails.
pub async fn remove(app: &App, movie_id: MovieId) -> Result<(), CommandError> {
    let page = app.cart_page();
    page.load().await?;

    let outcome = page.remove(movie_id).await?;
    if let RemovalOutcome::Rederived(item) = &outcome {
        info!(movie_id = %movie_id, price = %item.price, "Removed {}", item.title);
    } else {
        info!(movie_id = %movie_id, "Removed movie not found in fetched cart");
    }
    info!(count = %app.store().read(), total = %page.total(), "Cart total");
    Ok(())
}

/// Remove every movie.
///
/// # Errors
///
/// Returns an error if the backend refuses.
pub async fn empty(app: &App) -> Result<(), CommandError> {
    let page = app.cart_page();
    page.empty().await?;
    info!(count = %app.store().read(), "{EMPTY_CART_MESSAGE}");
    Ok(())
}
