use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::config::Config;
use crate::actor_framework::{Repository, ResourceActor};
use crate::cart_actor::CartService;
use crate::clients::{CartClient, CatalogClient, LedgerClient, ReservationClient};
use crate::clock::{Clock, SystemClock};
use crate::domain::{Order, OrderId, Product, ProductFields, ProductId};
use crate::order_actor::OrderRepository;
use crate::product_actor::{CatalogError, CatalogRepository};
use crate::reservation::{ExpirySweeper, ReservationService};

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, running the
/// expiry sweep, and handling shutdown.
pub struct ShopSystem {
    pub catalog: CatalogClient,
    pub ledger: LedgerClient,
    pub carts: CartClient,
    pub reservations: ReservationClient,
    config: Config,
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl ShopSystem {
    /// Starts every actor on in-memory storage and the system clock.
    pub fn new(config: Config) -> Self {
        Self::with_parts(config, Arc::new(SystemClock), CatalogRepository::new(), OrderRepository::new())
    }

    pub fn with_parts(
        config: Config,
        clock: Arc<dyn Clock>,
        products: impl Repository<Product>,
        orders: impl Repository<Order>,
    ) -> Self {
        let buffer_size = config.actor_buffer_size;

        // 1. Catalog store
        let (catalog_actor, catalog_resource) = ResourceActor::<Product, _>::new(
            buffer_size,
            products,
            |last: Option<&ProductId>| last.map_or(1, |id| id + 1),
        );
        let catalog = CatalogClient::new(catalog_resource);
        let catalog_handle = tokio::spawn(catalog_actor.run());

        // 2. Order ledger
        let (ledger_actor, ledger_resource) =
            ResourceActor::<Order, _>::new(buffer_size, orders, OrderId::next_after);
        let ledger = LedgerClient::new(ledger_resource);
        let ledger_handle = tokio::spawn(ledger_actor.run());

        // 3. Cart sessions, subscribed to catalog changes
        let (cart_service, carts) = CartService::new(buffer_size, catalog.clone());
        let cart_handle = tokio::spawn(cart_service.run());

        // 4. Reservation root actor
        let (reservation_service, reservations) = ReservationService::new(
            buffer_size,
            catalog.clone(),
            ledger.clone(),
            clock.clone(),
            config.expiry_policy(),
            config.service_fee,
        );
        let reservation_handle = tokio::spawn(reservation_service.run());

        // 5. Expiry sweep
        let shutdown = CancellationToken::new();
        let sweeper = ExpirySweeper::new(
            ledger.clone(),
            reservations.clone(),
            clock,
            config.sweep_interval,
            shutdown.clone(),
        );
        let sweeper_handle = tokio::spawn(sweeper.run());

        info!(buffer_size, "Shop system started");
        Self {
            catalog,
            ledger,
            carts,
            reservations,
            config,
            shutdown,
            handles: vec![catalog_handle, ledger_handle, cart_handle, reservation_handle, sweeper_handle],
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates `products` in order; ids follow the catalog's sequence.
    pub async fn seed_catalog(&self, products: Vec<ProductFields>) -> Result<Vec<Product>, CatalogError> {
        let mut created = Vec::with_capacity(products.len());
        for fields in products {
            created.push(self.catalog.create_product(fields).await?);
        }
        info!(count = created.len(), "Catalog seeded");
        Ok(created)
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        self.shutdown.cancel();

        // Root actor first so no new work reaches the stores
        if let Err(e) = self.reservations.shutdown().await {
            warn!(error = %e, "Reservation service already stopped");
        }
        if let Err(e) = self.carts.shutdown().await {
            warn!(error = %e, "Cart service already stopped");
        }
        if let Err(e) = self.catalog.shutdown().await {
            warn!(error = %e, "Catalog already stopped");
        }
        if let Err(e) = self.ledger.shutdown().await {
            warn!(error = %e, "Ledger already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
