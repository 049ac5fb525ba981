//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_get`] or [`expect_batch`] to assert behavior.

use tokio::sync::{broadcast, mpsc};

use crate::actor_framework::{
    Entity, MissingPolicy, ResourceClient, ResourceRequest, Response, EVENT_CHANNEL_CAPACITY,
};

/// Creates a mock client and a receiver for asserting requests.
///
/// The client sends to a channel the test controls instead of a running
/// `ResourceActor`, so the test decides every reply.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    (ResourceClient::new(sender, events), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreatePayload, Response<T, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { payload, respond_to }) => Some((payload, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<Response<Vec<T>, T::Error>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an ActionBatch request
pub async fn expect_batch<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Vec<(T::Id, T::Action)>, MissingPolicy, Response<Vec<T::ActionResult>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::ActionBatch { actions, missing, respond_to }) => Some((actions, missing, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{CatalogClient, LedgerClient};
    use crate::domain::{OrderId, Product, ProductFields};
    use crate::order_actor::OrderError;
    use crate::product_actor::{CatalogError, ProductAction, ProductActionResult, StockError, StockShortfall};
    use rust_decimal_macros::dec;

    fn pie(stock: u32) -> Product {
        Product::from_fields(1, ProductFields::new("Chicken Pie", dec!(2.50), "Food", stock, "1234567890"))
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (resource, mut receiver) = create_mock_client::<Product>(10);
        let client = CatalogClient::new(resource);

        let create_task = {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .create_product(ProductFields::new("Chicken Pie", dec!(2.50), "Food", 15, "1234567890"))
                    .await
            })
        };
        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Chicken Pie");
        responder.send(Ok(Product::from_fields(1, payload))).unwrap();
        assert_eq!(create_task.await.unwrap().unwrap().id, 1);

        let get_task = tokio::spawn(async move { client.get_product(42).await });
        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, 42);
        responder.send(Ok(None)).unwrap();
        assert_eq!(get_task.await.unwrap(), Err(CatalogError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_reserve_sends_one_failing_batch() {
        let (resource, mut receiver) = create_mock_client::<Product>(10);
        let client = CatalogClient::new(resource);

        let task = tokio::spawn(async move { client.reserve(&[(1, 2), (5, 4)]).await });
        let (actions, missing, responder) = expect_batch(&mut receiver).await.expect("Expected ActionBatch request");
        assert_eq!(missing, MissingPolicy::Fail);
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], (1, ProductAction::AdjustStock(-2))));
        assert!(matches!(actions[1], (5, ProductAction::AdjustStock(-4))));

        let shortfall = StockShortfall { product_id: 5, name: "Chocolate Bar".into(), requested: 4, available: 3 };
        responder.send(Err(CatalogError::Stock(StockError::single(shortfall.clone())))).unwrap();
        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.shortfalls(), Some(vec![shortfall]));
    }

    #[tokio::test]
    async fn test_adjust_stock_unwraps_result() {
        let (resource, mut receiver) = create_mock_client::<Product>(10);
        let client = CatalogClient::new(resource);

        let task = tokio::spawn(async move { client.adjust_stock(1, 3).await });
        let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        assert_eq!(id, 1);
        assert!(matches!(action, ProductAction::AdjustStock(3)));
        responder.send(Ok(ProductActionResult::Adjusted(pie(18)))).unwrap();
        assert_eq!(task.await.unwrap().unwrap().stock, 18);
    }

    #[tokio::test]
    async fn test_closed_actor_maps_to_communication_error() {
        let (resource, receiver) = create_mock_client::<crate::domain::Order>(1);
        drop(receiver);
        let ledger = LedgerClient::new(resource);
        let err = ledger.get_order(OrderId::new(1)).await.unwrap_err();
        assert!(matches!(err, OrderError::ActorCommunicationError(_)));
    }

    #[tokio::test]
    async fn test_barcode_lookup_lists_catalog() {
        let (resource, mut receiver) = create_mock_client::<Product>(10);
        let client = CatalogClient::new(resource);

        let task = tokio::spawn(async move { client.get_product_by_barcode(" 0000000000 ").await });
        let responder = expect_list(&mut receiver).await.expect("Expected List request");
        responder.send(Ok(vec![pie(15)])).unwrap();
        assert_eq!(task.await.unwrap(), Err(CatalogError::BarcodeNotFound("0000000000".into())));
    }
}
