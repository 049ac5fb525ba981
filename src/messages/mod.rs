use tokio::sync::oneshot;

use crate::cart_actor::{CartError, Reconciled, SessionId};
use crate::domain::{Cart, Order, OrderId, ProductId, TokenPayload};
use crate::order_actor::ExpireOutcome;
use crate::reservation::{CheckoutRequest, ReservationError};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for the hand-written services. Each variant carries its
/// parameters and a oneshot channel for the response.

#[derive(Debug)]
pub enum CartRequest {
    AddItem {
        session: SessionId,
        product_id: ProductId,
        quantity: u32,
        respond_to: ServiceResponse<Cart, CartError>,
    },
    SetQuantity {
        session: SessionId,
        product_id: ProductId,
        quantity: u32,
        respond_to: ServiceResponse<Cart, CartError>,
    },
    RemoveItem {
        session: SessionId,
        product_id: ProductId,
        respond_to: ServiceResponse<Cart, CartError>,
    },
    GetCart {
        session: SessionId,
        respond_to: ServiceResponse<Reconciled, CartError>,
    },
    Clear {
        session: SessionId,
        respond_to: ServiceResponse<(), CartError>,
    },
    Shutdown,
    #[cfg(test)]
    PeekCart {
        session: SessionId,
        respond_to: ServiceResponse<Option<Cart>, CartError>,
    },
}

#[derive(Debug)]
pub enum ReservationRequest {
    Checkout {
        cart: Cart,
        request: CheckoutRequest,
        respond_to: ServiceResponse<Order, ReservationError>,
    },
    Expire {
        order_id: OrderId,
        respond_to: ServiceResponse<ExpireOutcome, ReservationError>,
    },
    Cancel {
        order_id: OrderId,
        respond_to: ServiceResponse<ExpireOutcome, ReservationError>,
    },
    ReissueToken {
        order_id: OrderId,
        respond_to: ServiceResponse<TokenPayload, ReservationError>,
    },
    Shutdown,
}
