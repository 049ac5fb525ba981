use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::ProductId;
use crate::product_actor::{CatalogError, StockError};

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error(transparent)]
    Stock(#[from] StockError),
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
    #[error("Cart validation error: {0}")]
    ValidationError(String),
    #[error("Catalog error: {0}")]
    Catalog(CatalogError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<CatalogError> for CartError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(id) => CartError::ProductNotFound(id),
            CatalogError::Stock(stock) => CartError::Stock(stock),
            other => CartError::Catalog(other),
        }
    }
}

impl From<FrameworkError> for CartError {
    fn from(e: FrameworkError) -> Self {
        CartError::ActorCommunicationError(e.to_string())
    }
}
