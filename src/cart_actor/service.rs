use std::collections::HashMap;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, warn};

use super::aggregate::{self, Reconciled};
use super::error::CartError;
use crate::actor_framework::ResourceEvent;
use crate::clients::{CartClient, CatalogClient};
use crate::domain::{Cart, Product, ProductId};
use crate::messages::{CartRequest, ServiceResponse};

/// Opaque shopper session key.
pub type SessionId = String;

/// Keeps one cart per shopper session.
///
/// Listens to catalog events so a deleted product disappears from every cart
/// without waiting for the next read.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    catalog: CatalogClient,
    catalog_events: broadcast::Receiver<ResourceEvent<Product>>,
    carts: HashMap<SessionId, Cart>,
}

impl CartService {
    pub fn new(buffer_size: usize, catalog: CatalogClient) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let catalog_events = catalog.subscribe();
        let service = Self {
            receiver,
            catalog,
            catalog_events,
            carts: HashMap::new(),
        };
        (service, CartClient::new(sender))
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!("CartService starting");
        let mut watching_catalog = true;
        loop {
            tokio::select! {
                biased;

                event = self.catalog_events.recv(), if watching_catalog => {
                    watching_catalog = self.handle_catalog_event(event);
                }
                msg = self.receiver.recv() => {
                    let Some(msg) = msg else { break };
                    match msg {
                        CartRequest::AddItem { session, product_id, quantity, respond_to } => {
                            self.handle_add_item(session, product_id, quantity, respond_to).await;
                        }
                        CartRequest::SetQuantity { session, product_id, quantity, respond_to } => {
                            self.handle_set_quantity(session, product_id, quantity, respond_to).await;
                        }
                        CartRequest::RemoveItem { session, product_id, respond_to } => {
                            self.handle_remove_item(session, product_id, respond_to);
                        }
                        CartRequest::GetCart { session, respond_to } => {
                            self.handle_get_cart(session, respond_to).await;
                        }
                        CartRequest::Clear { session, respond_to } => {
                            self.handle_clear(session, respond_to);
                        }
                        CartRequest::Shutdown => {
                            info!("CartService shutting down");
                            break;
                        }
                        #[cfg(test)]
                        CartRequest::PeekCart { session, respond_to } => {
                            let _ = respond_to.send(Ok(self.carts.get(&session).cloned()));
                        }
                    }
                }
            }
        }
        info!("CartService stopped");
    }

    /// Returns whether to keep listening.
    fn handle_catalog_event(&mut self, event: Result<ResourceEvent<Product>, RecvError>) -> bool {
        match event {
            Ok(ResourceEvent::Deleted(product_id)) => {
                self.handle_product_deleted(product_id);
                true
            }
            Ok(_) => true,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Missed catalog events; carts reconcile on next read");
                true
            }
            Err(RecvError::Closed) => {
                debug!("Catalog event stream closed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    fn handle_product_deleted(&mut self, product_id: ProductId) {
        let mut affected = 0;
        for cart in self.carts.values_mut() {
            let before = cart.lines.len();
            cart.lines.retain(|line| line.product_id != product_id);
            if cart.lines.len() != before {
                affected += 1;
            }
        }
        self.carts.retain(|_, cart| !cart.is_empty());
        if affected > 0 {
            info!(affected, "Removed deleted product from carts");
        }
    }

    fn cart(&self, session: &str) -> Cart {
        self.carts.get(session).cloned().unwrap_or_default()
    }

    /// Empty carts are dropped rather than kept per session.
    fn store(&mut self, session: SessionId, cart: &Cart) {
        if cart.is_empty() {
            self.carts.remove(&session);
        } else {
            self.carts.insert(session, cart.clone());
        }
    }

    #[instrument(skip(self, respond_to))]
    async fn handle_add_item(
        &mut self,
        session: SessionId,
        product_id: ProductId,
        quantity: u32,
        respond_to: ServiceResponse<Cart, CartError>,
    ) {
        debug!("Processing add_item request");
        let product = match self.catalog.get_product(product_id).await {
            Ok(product) => product,
            Err(e) => {
                warn!(error = %e, "Product lookup failed");
                let _ = respond_to.send(Err(e.into()));
                return;
            }
        };
        let result = aggregate::add_item(self.cart(&session), &product, quantity);
        match &result {
            Ok(cart) => {
                info!(in_cart = cart.quantity_of(product_id), "Item added to cart");
                self.store(session, cart);
            }
            Err(e) => warn!(error = %e, "Item not added"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    async fn handle_set_quantity(
        &mut self,
        session: SessionId,
        product_id: ProductId,
        quantity: u32,
        respond_to: ServiceResponse<Cart, CartError>,
    ) {
        debug!("Processing set_quantity request");
        if quantity == 0 {
            let cart = aggregate::remove_item(self.cart(&session), product_id);
            self.store(session, &cart);
            let _ = respond_to.send(Ok(cart));
            return;
        }
        let product = match self.catalog.get_product(product_id).await {
            Ok(product) => product,
            Err(e) => {
                warn!(error = %e, "Product lookup failed");
                let _ = respond_to.send(Err(e.into()));
                return;
            }
        };
        let result = aggregate::set_quantity(self.cart(&session), &product, quantity);
        match &result {
            Ok(cart) => {
                info!("Quantity updated");
                self.store(session, cart);
            }
            Err(e) => warn!(error = %e, "Quantity not updated"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_remove_item(
        &mut self,
        session: SessionId,
        product_id: ProductId,
        respond_to: ServiceResponse<Cart, CartError>,
    ) {
        debug!("Processing remove_item request");
        let cart = aggregate::remove_item(self.cart(&session), product_id);
        self.store(session, &cart);
        let _ = respond_to.send(Ok(cart));
    }

    /// Reconciles the stored cart against a fresh catalog snapshot and keeps the result.
    #[instrument(skip(self, respond_to))]
    async fn handle_get_cart(&mut self, session: SessionId, respond_to: ServiceResponse<Reconciled, CartError>) {
        debug!("Processing get_cart request");
        let catalog = match self.catalog.list_products().await {
            Ok(products) => products,
            Err(e) => {
                warn!(error = %e, "Catalog snapshot failed");
                let _ = respond_to.send(Err(e.into()));
                return;
            }
        };
        let reconciled = aggregate::reconcile(&self.cart(&session), &catalog);
        for adjustment in &reconciled.adjustments {
            warn!(%adjustment, "Cart adjusted");
        }
        if self.carts.contains_key(&session) {
            self.store(session, &reconciled.cart);
        }
        let _ = respond_to.send(Ok(reconciled));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_clear(&mut self, session: SessionId, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing clear request");
        if self.carts.remove(&session).is_some() {
            info!("Cart cleared");
        }
        let _ = respond_to.send(Ok(()));
    }
}
