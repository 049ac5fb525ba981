use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::order_actor::OrderError;
use crate::product_actor::{CatalogError, StockError};
use crate::token::TokenError;

/// Errors that can occur while reserving, expiring or collecting an order.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReservationError {
    #[error("Checkout validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Stock(#[from] StockError),
    #[error(transparent)]
    Catalog(CatalogError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<CatalogError> for ReservationError {
    fn from(e: CatalogError) -> Self {
        match e.shortfalls() {
            Some(shortfalls) => ReservationError::Stock(StockError { shortfalls }),
            None => ReservationError::Catalog(e),
        }
    }
}

impl From<FrameworkError> for ReservationError {
    fn from(e: FrameworkError) -> Self {
        ReservationError::ActorCommunicationError(e.to_string())
    }
}
