//! ReelCart Core - Shared cart types.
//!
//! This crate provides the domain types used by every ReelCart component:
//! - `client` - Cart synchronization engine and REST client
//! - `cli` - Command-line driver for the cart backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async
//! runtime. Everything here is plain data with derived invariants, so it can
//! be used (and tested) anywhere.
//!
//! # Modules
//!
//! - [`types`] - Movie IDs, prices, cart items, snapshots, counts and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
