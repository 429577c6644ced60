//! CLI command implementations.
//!
//! Every command mounts the same surfaces a UI would and reports through
//! `tracing`.

pub mod cart;
pub mod checkout;

use reelcart_client::{CartApp, CartError, ClientConfig, HttpCartService, RemoteError};
use reelcart_core::BuyerInfoError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The HTTP client could not be built.
    #[error("Client setup failed: {0}")]
    Client(#[from] RemoteError),

    /// A cart operation failed.
    #[error("{}", .0.user_message())]
    Cart(#[from] CartError),

    /// Buyer details were rejected before reaching the backend.
    #[error("Invalid buyer details: {0}")]
    Buyer(#[from] BuyerInfoError),
}

/// Build the application for a configured backend.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn connect(config: ClientConfig) -> Result<CartApp<HttpCartService>, CommandError> {
    tracing::debug!(config = ?config, "Connecting to cart backend");
    Ok(CartApp::connect(config)?)
}
