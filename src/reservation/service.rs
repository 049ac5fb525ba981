use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::checkout::{price_lines, CheckoutRequest};
use super::error::ReservationError;
use super::phone::normalize_mobile_number;
use super::policy::ExpiryPolicy;
use crate::clients::{CatalogClient, LedgerClient, ReservationClient};
use crate::clock::Clock;
use crate::domain::{Cart, Order, OrderCreate, OrderId, OrderItem, PaymentMethod, ProductId, TokenPayload};
use crate::messages::{ReservationRequest, ServiceResponse};
use crate::order_actor::ExpireOutcome;

/// Root actor that turns carts into reserved, pending orders and releases
/// the stock of orders nobody collects.
///
/// Checkout and expiry run one at a time through this mailbox.
pub struct ReservationService {
    receiver: mpsc::Receiver<ReservationRequest>,
    catalog: CatalogClient,
    ledger: LedgerClient,
    clock: Arc<dyn Clock>,
    policy: ExpiryPolicy,
    service_fee: Decimal,
}

impl ReservationService {
    pub fn new(
        buffer_size: usize,
        catalog: CatalogClient,
        ledger: LedgerClient,
        clock: Arc<dyn Clock>,
        policy: ExpiryPolicy,
        service_fee: Decimal,
    ) -> (Self, ReservationClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let client = ReservationClient::new(sender, ledger.clone(), clock.clone());
        let service = Self {
            receiver,
            catalog,
            ledger,
            clock,
            policy,
            service_fee,
        };
        (service, client)
    }

    #[instrument(name = "reservation_service", skip(self))]
    pub async fn run(mut self) {
        info!("ReservationService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ReservationRequest::Checkout { cart, request, respond_to } => {
                    self.handle_checkout(cart, request, respond_to).await;
                }
                ReservationRequest::Expire { order_id, respond_to } => {
                    self.handle_expire(order_id, respond_to).await;
                }
                ReservationRequest::Cancel { order_id, respond_to } => {
                    self.handle_cancel(order_id, respond_to).await;
                }
                ReservationRequest::ReissueToken { order_id, respond_to } => {
                    self.handle_reissue_token(order_id, respond_to).await;
                }
                ReservationRequest::Shutdown => {
                    info!("ReservationService shutting down");
                    break;
                }
            }
        }
        info!("ReservationService stopped");
    }

    #[instrument(
        fields(lines = cart.lines.len(), payment_method = %request.payment_method),
        skip(self, cart, request, respond_to)
    )]
    async fn handle_checkout(
        &self,
        cart: Cart,
        request: CheckoutRequest,
        respond_to: ServiceResponse<Order, ReservationError>,
    ) {
        info!("Processing checkout request");
        let result = self.checkout(cart, request).await;
        match &result {
            Ok(order) => info!(order_id = %order.id, total = %order.total, "Order reserved"),
            Err(e) => warn!(error = %e, "Checkout rejected"),
        }
        let _ = respond_to.send(result);
    }

    async fn checkout(&self, cart: Cart, request: CheckoutRequest) -> Result<Order, ReservationError> {
        // Step 1: Validate the request itself
        if cart.is_empty() {
            return Err(ReservationError::ValidationError("Cart is empty".to_string()));
        }
        let phone_number = match request.payment_method {
            PaymentMethod::MobileMoney => {
                Some(normalize_mobile_number(request.phone_number.as_deref().unwrap_or_default())?)
            }
            PaymentMethod::Cash => None,
        };
        let customer = request
            .customer
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        // Step 2: Re-price and re-check every line against the live catalog
        let catalog = self.catalog.list_products().await?;
        let items = price_lines(&cart, &catalog)?;
        let lines: Vec<(ProductId, u32)> = items.iter().map(|item| (item.id, item.quantity)).collect();

        // Step 3: Take the stock, all lines or none
        self.catalog.reserve(&lines).await?;
        debug!("Stock reserved");

        // Step 4: Record the pending order and its first token
        let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();
        let issued_at = self.clock.now();
        let payload = OrderCreate {
            items,
            total: subtotal + self.service_fee,
            payment_method: request.payment_method,
            customer,
            phone_number,
            issued_at,
            expiry_time: issued_at + self.policy.window(request.payment_method),
        };
        match self.ledger.create_order(payload).await {
            Ok(order) => Ok(order),
            Err(e) => {
                error!(error = %e, "Order creation failed, releasing stock");
                if let Err(restock_error) = self.catalog.restock(&lines).await {
                    error!(error = %restock_error, "Stock release failed");
                }
                Err(e.into())
            }
        }
    }

    #[instrument(fields(order_id = %order_id), skip(self, respond_to))]
    async fn handle_expire(&self, order_id: OrderId, respond_to: ServiceResponse<ExpireOutcome, ReservationError>) {
        debug!("Processing expire request");
        let _ = respond_to.send(self.expire(order_id).await);
    }

    async fn expire(&self, order_id: OrderId) -> Result<ExpireOutcome, ReservationError> {
        let outcome = self.ledger.expire(order_id).await?;
        match &outcome {
            ExpireOutcome::Cancelled(order) => {
                self.release(order).await?;
                info!(items = order.item_count(), "Order expired and stock released");
            }
            ExpireOutcome::AlreadyCancelled => debug!("Order already cancelled"),
            ExpireOutcome::NotPending(status) => warn!(%status, "Order moved on before expiry"),
        }
        Ok(outcome)
    }

    #[instrument(fields(order_id = %order_id), skip(self, respond_to))]
    async fn handle_cancel(&self, order_id: OrderId, respond_to: ServiceResponse<ExpireOutcome, ReservationError>) {
        debug!("Processing cancel request");
        let result = self.cancel(order_id).await;
        if let Err(e) = &result {
            warn!(error = %e, "Order not cancelled");
        }
        let _ = respond_to.send(result);
    }

    async fn cancel(&self, order_id: OrderId) -> Result<ExpireOutcome, ReservationError> {
        let outcome = self.ledger.cancel(order_id).await?;
        match &outcome {
            ExpireOutcome::Cancelled(order) => {
                self.release(order).await?;
                info!(items = order.item_count(), "Order cancelled and stock released");
            }
            ExpireOutcome::AlreadyCancelled => debug!("Order already cancelled"),
            ExpireOutcome::NotPending(status) => debug!(%status, "Order not cancelled"),
        }
        Ok(outcome)
    }

    /// Puts a cancelled order's items back on the shelf. Deleted products are skipped.
    async fn release(&self, order: &Order) -> Result<(), ReservationError> {
        let lines: Vec<(ProductId, u32)> = order.items.iter().map(|item| (item.id, item.quantity)).collect();
        let restocked = self.catalog.restock(&lines).await?;
        if restocked.len() < lines.len() {
            warn!(skipped = lines.len() - restocked.len(), "Some products were deleted before restock");
        }
        Ok(())
    }

    #[instrument(fields(order_id = %order_id), skip(self, respond_to))]
    async fn handle_reissue_token(
        &self,
        order_id: OrderId,
        respond_to: ServiceResponse<TokenPayload, ReservationError>,
    ) {
        debug!("Processing reissue_token request");
        let result = self.reissue_token(order_id).await;
        match &result {
            Ok(token) => info!(expiry_time = %token.expiry_time, "Token reissued"),
            Err(e) => warn!(error = %e, "Token not reissued"),
        }
        let _ = respond_to.send(result);
    }

    async fn reissue_token(&self, order_id: OrderId) -> Result<TokenPayload, ReservationError> {
        let order = self.ledger.get_order(order_id).await?;
        let issued_at = self.clock.now();
        let expiry_time = issued_at + self.policy.window(order.payment_method);
        Ok(self.ledger.reissue_token(order_id, issued_at, expiry_time).await?)
    }
}
