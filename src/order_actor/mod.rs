//! Order ledger: the order state machine, expiry outcomes and dashboard queries.

mod actions;
pub mod entity;
pub mod error;
pub mod query;

pub use actions::*;
pub use error::*;
pub use query::{LedgerSummary, OrderQuery, OrderSort};

/// Default ledger storage.
pub type OrderRepository = crate::actor_framework::InMemoryRepository<crate::domain::Order>;
