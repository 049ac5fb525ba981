use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use super::LedgerClient;
use crate::actor_framework::FrameworkError;
use crate::clock::Clock;
use crate::domain::{Cart, Order, OrderId, TokenPayload};
use crate::messages::ReservationRequest;
use crate::order_actor::ExpireOutcome;
use crate::reservation::{CheckoutRequest, ReservationError};
use crate::token;

/// Client for the reservation service.
///
/// Collection checks only read the ledger, so they run on the caller's task
/// instead of queueing behind checkouts.
#[derive(Clone)]
pub struct ReservationClient {
    sender: mpsc::Sender<ReservationRequest>,
    ledger: LedgerClient,
    clock: Arc<dyn Clock>,
}

impl ReservationClient {
    pub fn new(sender: mpsc::Sender<ReservationRequest>, ledger: LedgerClient, clock: Arc<dyn Clock>) -> Self {
        Self { sender, ledger, clock }
    }

    /// Resolves a scanned collection code to its live order.
    ///
    /// # Errors
    /// `Token(Malformed)` for anything that isn't a collection token,
    /// `Token(Expired)` once the token's expiry has passed, and
    /// `Order(NotFound)` for tokens naming an unknown order.
    #[instrument(skip(self, encoded))]
    pub async fn process_collection(&self, encoded: &str) -> Result<Order, ReservationError> {
        debug!("Processing collection request");
        let payload = token::decode(encoded)?;
        token::validate(&payload, self.clock.now())?;
        let order = self.ledger.get_order(payload.order_id).await?;
        info!(order_id = %order.id, status = %order.status, "Collection token accepted");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), ReservationError> {
        debug!("Sending shutdown request");
        self.sender
            .send(ReservationRequest::Shutdown)
            .await
            .map_err(|_| ReservationError::from(FrameworkError::ActorClosed))
    }
}

client_method!(ReservationClient => fn checkout(cart: Cart, request: CheckoutRequest) -> Order as ReservationRequest::Checkout, Error = ReservationError);
client_method!(ReservationClient => fn expire(order_id: OrderId) -> ExpireOutcome as ReservationRequest::Expire, Error = ReservationError);
client_method!(ReservationClient => fn cancel(order_id: OrderId) -> ExpireOutcome as ReservationRequest::Cancel, Error = ReservationError);
client_method!(ReservationClient => fn reissue_token(order_id: OrderId) -> TokenPayload as ReservationRequest::ReissueToken, Error = ReservationError);
