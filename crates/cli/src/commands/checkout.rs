//! Checkout commands.

use reelcart_client::surfaces::EMPTY_CART_MESSAGE;
use reelcart_client::{CartApp, CartError, HttpCartService};
use reelcart_core::BuyerInfo;
use tracing::info;

use super::CommandError;

type App = CartApp<HttpCartService>;

/// Print the authoritative checkout total.
///
/// # Errors
///
/// Returns an error if the total cannot be fetched.
pub async fn total(app: &App) -> Result<(), CommandError> {
    let panel = app.checkout();
    let total = panel.load_total().await?;
    if total.is_empty_cart() {
        info!("{EMPTY_CART_MESSAGE}");
    } else {
        info!(total = %total.amount(), "Checkout total");
    }
    Ok(())
}

/// Pay for the cart.
///
/// # Errors
///
/// Returns an error if the buyer details are invalid, the cart is empty, or
/// the backend refuses the payment.
pub async fn complete(
    app: &App,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<(), CommandError> {
    let buyer = BuyerInfo::new(first_name, last_name, email)?;

    let panel = app.checkout();
    let total = panel.load_total().await?;
    if !panel.can_checkout() {
        return Err(CartError::CheckoutBlocked.into());
    }

    panel.complete_payment(buyer).await?;
    info!(
        total = %total.amount(),
        "{}",
        panel.message().unwrap_or_default()
    );
    Ok(())
}
