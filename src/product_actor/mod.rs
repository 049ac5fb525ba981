//! Product-specific domain logic, including stock management actions.

mod actions;
pub mod entity;
pub mod error;
pub mod query;

pub use actions::*;
pub use error::*;
pub use query::{CatalogQuery, ProductSort, StockLevel, StockThresholds};

/// Default catalog storage.
pub type CatalogRepository = crate::actor_framework::InMemoryRepository<crate::domain::Product>;
