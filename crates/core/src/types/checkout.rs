//! Checkout inputs and the authoritative cart total.

use serde::{Deserialize, Serialize};

use crate::types::{Email, EmailError, Price};

/// Errors that can occur when building [`BuyerInfo`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuyerInfoError {
    /// First name is blank.
    #[error("first name cannot be empty")]
    MissingFirstName,
    /// Last name is blank.
    #[error("last name cannot be empty")]
    MissingLastName,
    /// Email failed validation.
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Who is paying, as submitted with a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
}

impl BuyerInfo {
    /// Validate and build buyer details. Names are trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is blank or the email is malformed.
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Result<Self, BuyerInfoError> {
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(BuyerInfoError::MissingFirstName);
        }
        let last_name = last_name.trim();
        if last_name.is_empty() {
            return Err(BuyerInfoError::MissingLastName);
        }
        Ok(Self {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: Email::parse(email)?,
        })
    }
}

/// The cart total as reported by the backend.
///
/// Checkout reads this directly from the server rather than from any local
/// projection. A total of exactly zero means the cart is empty, and that is
/// the only rule gating payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutTotal(Price);

impl CheckoutTotal {
    /// Wrap an authoritative amount.
    #[must_use]
    pub const fn new(amount: Price) -> Self {
        Self(amount)
    }

    /// The amount.
    #[must_use]
    pub const fn amount(&self) -> Price {
        self.0
    }

    /// Whether the cart is empty (total is exactly zero).
    #[must_use]
    pub fn is_empty_cart(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether the buyer may proceed to payment.
    #[must_use]
    pub fn allows_checkout(&self) -> bool {
        !self.is_empty_cart()
    }
}
