use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{OrderId, OrderStatus};

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::DuplicateId(id) => OrderError::ValidationError(format!("Duplicate order id: {}", id)),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
