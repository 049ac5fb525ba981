use tracing::{error, info, warn, Instrument};

use tuckshop::app_system::{setup_tracing, starter_products, Config, ShopSystem};
use tuckshop::domain::OrderStatus;
use tuckshop::reservation::CheckoutRequest;
use tuckshop::token;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::from_env();
    info!(?config, "Starting tuck shop");

    let system = ShopSystem::new(config);
    system
        .seed_catalog(starter_products())
        .await
        .map_err(|e| e.to_string())?;

    let low_stock = system
        .catalog
        .low_stock(&system.config().stock_thresholds())
        .await
        .map_err(|e| e.to_string())?;
    for product in &low_stock {
        warn!(product = %product.name, stock = product.stock, "Low stock");
    }

    // A shopper scans two pies and a cola
    let session = "demo-session".to_string();
    let span = tracing::info_span!("shopping", session = %session);
    let cart = async {
        let pie = system.catalog.get_product_by_barcode("1234567890").await.map_err(|e| e.to_string())?;
        let cola = system.catalog.get_product_by_barcode("1234567892").await.map_err(|e| e.to_string())?;
        system.carts.add_item(session.clone(), pie.id, 2).await.map_err(|e| e.to_string())?;
        system.carts.add_item(session.clone(), cola.id, 1).await.map_err(|e| e.to_string())?;
        let reconciled = system.carts.get_cart(session.clone()).await.map_err(|e| e.to_string())?;
        Ok::<_, String>(reconciled.cart)
    }
    .instrument(span)
    .await?;

    // Checkout reserves the stock and mints the collection token
    let span = tracing::info_span!("checkout");
    let order = async {
        system
            .reservations
            .checkout(cart, CheckoutRequest::cash().customer("Tariro"))
            .await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;
    system.carts.clear(session).await.map_err(|e| e.to_string())?;
    info!(order_id = %order.id, total = %order.total, expires = %order.expiry_time(), "Order placed");

    // The counter scans the QR code and staff move the order along
    let encoded = token::encode(&order.collection_token).map_err(|e| e.to_string())?;
    let collected = system
        .reservations
        .process_collection(&encoded)
        .await
        .map_err(|e| e.to_string())?;
    for status in [OrderStatus::Processing, OrderStatus::Ready, OrderStatus::Completed] {
        if let Err(e) = system.ledger.transition(collected.id, status).await {
            error!(error = %e, "Transition failed");
        }
    }

    // A second order that nobody collects
    let water_cart = {
        let water = system
            .catalog
            .get_product_by_barcode("1234567897")
            .await
            .map_err(|e| e.to_string())?;
        system
            .carts
            .add_item("late-shopper".to_string(), water.id, 3)
            .await
            .map_err(|e| e.to_string())?
    };
    let abandoned = system
        .reservations
        .checkout(water_cart, CheckoutRequest::mobile_money("077 123 4567"))
        .await
        .map_err(|e| e.to_string())?;
    let outcome = system
        .reservations
        .expire(abandoned.id)
        .await
        .map_err(|e| e.to_string())?;
    info!(order_id = %abandoned.id, ?outcome, "Abandoned order expired");

    let summary = system.ledger.summary().await.map_err(|e| e.to_string())?;
    info!(
        orders = summary.total_orders,
        completed = summary.count(OrderStatus::Completed),
        cancelled = summary.count(OrderStatus::Cancelled),
        revenue = %summary.revenue,
        "Ledger summary"
    );

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
