//! # Tuck-shop ordering engine
//!
//! Carts validated against live stock, checkout that reserves stock for a
//! pending order, a time-boxed collection token shown as a QR code, and an
//! expiry sweep that cancels uncollected orders and puts their stock back.
//!
//! ## Layout
//!
//! - **Domain types** → [`domain`]
//! - **Generic resource actor** with batch actions and change events → [`actor_framework`]
//! - **Catalog store** and **order ledger** entities → [`product_actor`], [`order_actor`]
//! - **Cart sessions** → [`cart_actor`]
//! - **Reservation engine** and expiry sweep → [`reservation`]
//! - **Collection token codec** → [`token`]
//! - **Clients** for every actor → [`clients`]
//! - **System coordinator**, config and tracing → [`app_system`]

pub mod actor_framework;
pub mod app_system;
pub mod cart_actor;
pub mod clients;
pub mod clock;
pub mod domain;
pub mod messages;
pub mod order_actor;
pub mod product_actor;
pub mod reservation;
pub mod token;

#[cfg(test)]
mod mock_framework;
