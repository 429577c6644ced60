//! Core types for ReelCart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod checkout;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use cart::{CartItem, CartSnapshot, ItemCount};
pub use checkout::{BuyerInfo, BuyerInfoError, CheckoutTotal};
pub use email::{Email, EmailError};
pub use id::MovieId;
pub use price::{Price, PriceError};
pub use status::MembershipStatus;
