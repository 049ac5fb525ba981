use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use super::error::ReservationError;
use crate::clients::{LedgerClient, ReservationClient};
use crate::clock::Clock;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Background task that expires pending orders whose token has run out.
///
/// Expiry goes through the reservation service, so a sweep never races a
/// checkout or a manual expire.
pub struct ExpirySweeper {
    ledger: LedgerClient,
    reservations: ReservationClient,
    clock: Arc<dyn Clock>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ExpirySweeper {
    pub fn new(
        ledger: LedgerClient,
        reservations: ReservationClient,
        clock: Arc<dyn Clock>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self { ledger, reservations, clock, interval, shutdown }
    }

    #[instrument(name = "expiry_sweeper", skip(self), fields(interval_ms = self.interval.as_millis() as u64))]
    pub async fn run(self) {
        info!("Expiry sweeper started");
        let mut ticker = tokio::time::interval(self.interval.max(MIN_SWEEP_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = %e, "Expiry sweep failed");
                    }
                }
                _ = self.shutdown.cancelled() => {
                    info!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }
    }

    /// Expires every pending order whose token expiry is at or before now.
    /// Returns how many orders were cancelled.
    pub async fn sweep_once(&self) -> Result<usize, ReservationError> {
        let now = self.clock.now();
        let due: Vec<_> = self
            .ledger
            .list_orders()
            .await?
            .into_iter()
            .filter(|order| order.is_pending() && order.expiry_time() <= now)
            .collect();
        if due.is_empty() {
            debug!("No expired orders");
            return Ok(0);
        }

        let mut cancelled = 0;
        for order in due {
            match self.reservations.expire(order.id).await {
                Ok(outcome) if outcome.is_cancelled() => cancelled += 1,
                Ok(_) => {}
                Err(e) => error!(order_id = %order.id, error = %e, "Failed to expire order"),
            }
        }
        info!(cancelled, "Expiry sweep complete");
        Ok(cancelled)
    }
}
