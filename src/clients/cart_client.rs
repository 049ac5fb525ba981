use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::actor_framework::FrameworkError;
use crate::cart_actor::{CartError, Reconciled, SessionId};
use crate::domain::{Cart, ProductId};
use crate::messages::CartRequest;

/// Client for the cart session service.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CartError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|_| CartError::from(FrameworkError::ActorClosed))
    }
}

client_method!(CartClient => fn add_item(session: SessionId, product_id: ProductId, quantity: u32) -> Cart as CartRequest::AddItem, Error = CartError);
client_method!(CartClient => fn set_quantity(session: SessionId, product_id: ProductId, quantity: u32) -> Cart as CartRequest::SetQuantity, Error = CartError);
client_method!(CartClient => fn remove_item(session: SessionId, product_id: ProductId) -> Cart as CartRequest::RemoveItem, Error = CartError);
client_method!(CartClient => fn get_cart(session: SessionId) -> Reconciled as CartRequest::GetCart, Error = CartError);
client_method!(CartClient => fn clear(session: SessionId) -> () as CartRequest::Clear, Error = CartError);
#[cfg(test)]
client_method!(CartClient => fn peek_cart(session: SessionId) -> Option<Cart> as CartRequest::PeekCart, Error = CartError);
