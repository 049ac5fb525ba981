use std::convert::Infallible;

use rust_decimal::Decimal;

use super::actions::{ExpireOutcome, OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderId, OrderStatus, TokenPayload};

impl Entity for Order {
    type Id = OrderId;
    type CreatePayload = OrderCreate;
    type Patch = Infallible; // orders only change through actions
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a new pending Order and mints its first collection token.
    fn from_create(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::ValidationError("Order has no items".to_string()));
        }
        if let Some(item) = params.items.iter().find(|item| item.quantity == 0) {
            return Err(OrderError::ValidationError(format!("Quantity for {} must be at least 1", item.name)));
        }
        if params.total < Decimal::ZERO {
            return Err(OrderError::ValidationError(format!("Total must be non-negative, got {}", params.total)));
        }
        if params.expiry_time <= params.issued_at {
            return Err(OrderError::ValidationError("Token must expire after it is issued".to_string()));
        }

        let collection_token = TokenPayload {
            order_id: id,
            total: params.total,
            items: params.items.clone(),
            issued_at: params.issued_at,
            expiry_time: params.expiry_time,
            payment_method: params.payment_method,
            phone_number: params.phone_number.clone(),
        };
        Ok(Self {
            id,
            created_at: params.issued_at,
            status: OrderStatus::Pending,
            items: params.items,
            total: params.total,
            payment_method: params.payment_method,
            customer: params.customer,
            phone_number: params.phone_number,
            collection_token,
        })
    }

    fn not_found(id: &OrderId) -> OrderError {
        OrderError::NotFound(*id)
    }

    fn combine_errors(mut errors: Vec<OrderError>) -> OrderError {
        errors.remove(0)
    }

    fn on_update(&mut self, patch: Infallible) -> Result<(), OrderError> {
        match patch {}
    }

    fn on_delete(&self) -> Result<(), OrderError> {
        Err(OrderError::ValidationError(format!(
            "Order {} cannot be deleted; cancel it instead",
            self.id
        )))
    }

    /// Handles order-specific actions.
    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Transition(OrderStatus::Cancelled) => Err(OrderError::ValidationError(format!(
                "Order {} must be cancelled through the reservation service so its stock is released",
                self.id
            ))),
            OrderAction::Transition(next) => {
                if !self.status.can_transition_to(next) {
                    return Err(OrderError::InvalidTransition {
                        order_id: self.id,
                        from: self.status,
                        to: next,
                    });
                }
                self.status = next;
                Ok(OrderActionResult::Transitioned(self.clone()))
            }
            OrderAction::Expire => {
                let outcome = match self.status {
                    OrderStatus::Pending => {
                        self.status = OrderStatus::Cancelled;
                        ExpireOutcome::Cancelled(self.clone())
                    }
                    OrderStatus::Cancelled => ExpireOutcome::AlreadyCancelled,
                    other => ExpireOutcome::NotPending(other),
                };
                Ok(OrderActionResult::Expired(outcome))
            }
            OrderAction::Cancel => {
                let outcome = match self.status {
                    OrderStatus::Cancelled => ExpireOutcome::AlreadyCancelled,
                    status if status.can_transition_to(OrderStatus::Cancelled) => {
                        self.status = OrderStatus::Cancelled;
                        ExpireOutcome::Cancelled(self.clone())
                    }
                    from => {
                        return Err(OrderError::InvalidTransition {
                            order_id: self.id,
                            from,
                            to: OrderStatus::Cancelled,
                        })
                    }
                };
                Ok(OrderActionResult::Cancelled(outcome))
            }
            OrderAction::ReissueToken { issued_at, expiry_time } => {
                if self.status.is_terminal() {
                    return Err(OrderError::ValidationError(format!(
                        "Order {} is {}; no token can be issued",
                        self.id, self.status
                    )));
                }
                if expiry_time <= issued_at {
                    return Err(OrderError::ValidationError("Token must expire after it is issued".to_string()));
                }
                self.collection_token = TokenPayload::mint(self, issued_at, expiry_time);
                Ok(OrderActionResult::TokenReissued(self.collection_token.clone()))
            }
        }
    }
}
