//! Typed handles for the shop's actors.
//!
//! Every client is a cheap `Clone` wrapper around a mailbox sender. Resource
//! clients get their shared read methods from [`impl_resource_client!`];
//! hand-written services use [`client_method!`].

#[macro_use]
pub mod macros;

pub mod cart_client;
pub mod catalog_client;
pub mod ledger_client;
pub mod reservation_client;

pub use cart_client::CartClient;
pub use catalog_client::CatalogClient;
pub use ledger_client::LedgerClient;
pub use reservation_client::ReservationClient;
