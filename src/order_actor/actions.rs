use chrono::{DateTime, Utc};

use crate::domain::{Order, OrderStatus, TokenPayload};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Staff-driven move along the order state machine. Cancelling goes through `Cancel`.
    Transition(OrderStatus),
    /// Cancel if still pending. Never fails: repeated or late expiries are reported as outcomes.
    Expire,
    /// Staff cancellation of a pending or processing order.
    Cancel,
    /// Replace the collection token with a fresh one.
    ReissueToken {
        issued_at: DateTime<Utc>,
        expiry_time: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Transitioned(Order),
    Expired(ExpireOutcome),
    Cancelled(ExpireOutcome),
    TokenReissued(TokenPayload),
}

/// What an expiry or a staff cancel did to the order.
///
/// Only `Cancelled` hands back stock, so each order releases its reservation once.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpireOutcome {
    /// The order was live and is now cancelled; its stock must go back.
    Cancelled(Order),
    /// An earlier expiry or cancel already cancelled it.
    AlreadyCancelled,
    /// Staff moved the order on before the expiry landed.
    NotPending(OrderStatus),
}

impl ExpireOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExpireOutcome::Cancelled(_))
    }
}
