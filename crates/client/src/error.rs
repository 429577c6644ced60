//! Unified cart error handling with Sentry integration.
//!
//! Every engine operation returns `Result<T, CartError>`. Failures are
//! recovered at the operation boundary and handed back to the surface that
//! asked; nothing is broadcast and nothing is retried automatically.

use thiserror::Error;

use crate::remote::RemoteError;

/// The cart operations a surface can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    FetchSnapshot,
    RefreshCount,
    CheckMembership,
    FetchTotal,
    AddItem,
    RemoveItem,
    EmptyCart,
    Checkout,
}

impl CartOperation {
    /// Whether this operation changes cart contents on the server.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::AddItem | Self::RemoveItem | Self::EmptyCart | Self::Checkout
        )
    }

    /// Message shown to the user when this operation fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::FetchSnapshot => "Error fetching cart contents",
            Self::RefreshCount => "Error fetching number of items",
            Self::CheckMembership => "Error checking movie status",
            Self::FetchTotal => "Error fetching cart total",
            Self::AddItem => "Error adding movie to cart.",
            Self::RemoveItem => "Error removing movie from cart",
            Self::EmptyCart => "Error emptying the cart",
            Self::Checkout => "Error processing payment. Please try again.",
        }
    }
}

impl std::fmt::Display for CartOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FetchSnapshot => "fetch_snapshot",
            Self::RefreshCount => "refresh_count",
            Self::CheckMembership => "check_membership",
            Self::FetchTotal => "fetch_total",
            Self::AddItem => "add_item",
            Self::RemoveItem => "remove_item",
            Self::EmptyCart => "empty_cart",
            Self::Checkout => "checkout",
        };
        f.write_str(name)
    }
}

/// Broad category of a failure, for surfaces that render them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A read (snapshot, status, total) failed. No local state changed.
    Fetch,
    /// A write (add, remove, empty, checkout) failed. No local state changed
    /// and the triggering control stays enabled for retry.
    Mutation,
    /// Refused locally before reaching the backend.
    Local,
}

/// Error type for cart synchronization.
#[derive(Debug, Error)]
pub enum CartError {
    /// The backend call failed.
    #[error("{operation} failed: {source}")]
    Remote {
        operation: CartOperation,
        #[source]
        source: RemoteError,
    },

    /// The surface already has this operation in flight.
    #[error("{0} already in flight")]
    Busy(CartOperation),

    /// Checkout refused because the authoritative total is zero or unknown.
    #[error("checkout blocked: cart is empty")]
    CheckoutBlocked,

    /// The task running the operation panicked or was cancelled by the runtime.
    #[error("{operation} aborted: {reason}")]
    Aborted {
        operation: CartOperation,
        reason: String,
    },
}

impl CartError {
    /// Wrap a backend failure for an operation.
    #[must_use]
    pub const fn remote(operation: CartOperation, source: RemoteError) -> Self {
        Self::Remote { operation, source }
    }

    /// The operation that failed, if the failure belongs to one.
    #[must_use]
    pub const fn operation(&self) -> Option<CartOperation> {
        match self {
            Self::Remote { operation, .. } | Self::Aborted { operation, .. } => Some(*operation),
            Self::Busy(operation) => Some(*operation),
            Self::CheckoutBlocked => None,
        }
    }

    /// Classify the failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Remote { operation, .. } | Self::Aborted { operation, .. } => {
                if operation.is_mutation() {
                    FailureKind::Mutation
                } else {
                    FailureKind::Fetch
                }
            }
            Self::Busy(_) | Self::CheckoutBlocked => FailureKind::Local,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Internal details (status codes, bodies) are never included.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Remote { operation, .. } | Self::Aborted { operation, .. } => {
                operation.failure_message()
            }
            Self::Busy(_) => "Please wait for the current request to finish.",
            Self::CheckoutBlocked => "Your cart is empty.",
        }
    }

    /// Log the failure and, for mutations, capture it to Sentry.
    pub(crate) fn report(&self) {
        if self.kind() == FailureKind::Mutation {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Cart mutation failed"
            );
        } else {
            tracing::warn!(error = %self, "Cart operation failed");
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Add a breadcrumb for a committed cart change.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// changes leading up to an error.
pub fn add_breadcrumb(message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("cart".to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String(value.clone()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
