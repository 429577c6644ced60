//! ReelCart Client - Cart synchronization against a remote cart backend.
//!
//! The backend is the single source of truth for cart contents. This crate
//! keeps a shared item count in step with it and gives each UI surface the
//! state and actions it needs:
//!
//! - [`remote`] - The backend contract and its REST implementation
//! - [`store`] - Shared, observable item count
//! - [`engine`] - Operations that call the backend and commit confirmed changes
//! - [`surfaces`] - Navigation badge, cart page, add-to-cart widget, checkout
//! - [`state`] - Application root that mounts surfaces
//!
//! No change is ever shown before the backend confirms it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod engine;
pub mod error;
pub mod remote;
pub mod state;
pub mod store;
pub mod surfaces;

pub use config::{ClientConfig, ConfigError};
pub use engine::CartSyncEngine;
pub use error::{CartError, CartOperation, FailureKind};
pub use remote::{HttpCartService, RemoteCartService, RemoteError};
pub use state::CartApp;
pub use store::{CartStateStore, Subscription};
