//! Per-session shopping carts and their reconciliation against the catalog.

pub mod aggregate;
pub mod error;
pub mod service;

pub use aggregate::{CartAdjustment, Reconciled, RemovalReason};
pub use error::CartError;
pub use service::{CartService, SessionId};
