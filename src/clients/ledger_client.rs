use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Order, OrderCreate, OrderId, OrderStatus, TokenPayload};
use crate::order_actor::query::{select, summarize};
use crate::order_actor::{ExpireOutcome, LedgerSummary, OrderAction, OrderActionResult, OrderError, OrderQuery};

/// Client for the order ledger actor.
///
/// There is no delete: orders end as `completed` or `cancelled`.
#[derive(Clone)]
pub struct LedgerClient {
    inner: ResourceClient<Order>,
}

impl_resource_client!(LedgerClient, Order, OrderError, order);

fn unexpected() -> OrderError {
    OrderError::ActorCommunicationError("Unexpected result".to_string())
}

impl LedgerClient {
    /// Records a new pending order under the next free id.
    #[instrument(skip(self, payload), fields(items = payload.items.len(), total = %payload.total))]
    pub async fn create_order(&self, payload: OrderCreate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.create(payload).await
    }

    #[instrument(skip(self))]
    pub async fn query_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        Ok(select(self.inner.list().await?, query))
    }

    #[instrument(skip(self))]
    pub async fn transition(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::Transition(status)).await? {
            OrderActionResult::Transitioned(order) => Ok(order),
            _ => Err(unexpected()),
        }
    }

    /// Cancels the order if it is still pending. See [`ExpireOutcome`].
    #[instrument(skip(self))]
    pub async fn expire(&self, id: OrderId) -> Result<ExpireOutcome, OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::Expire).await? {
            OrderActionResult::Expired(outcome) => Ok(outcome),
            _ => Err(unexpected()),
        }
    }

    /// Cancels a pending or processing order. Stock is the caller's to release.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<ExpireOutcome, OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::Cancel).await? {
            OrderActionResult::Cancelled(outcome) => Ok(outcome),
            _ => Err(unexpected()),
        }
    }

    #[instrument(skip(self))]
    pub async fn reissue_token(
        &self,
        id: OrderId,
        issued_at: DateTime<Utc>,
        expiry_time: DateTime<Utc>,
    ) -> Result<TokenPayload, OrderError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, OrderAction::ReissueToken { issued_at, expiry_time })
            .await?
        {
            OrderActionResult::TokenReissued(token) => Ok(token),
            _ => Err(unexpected()),
        }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<LedgerSummary, OrderError> {
        debug!("Sending request");
        Ok(summarize(&self.inner.list().await?))
    }
}
