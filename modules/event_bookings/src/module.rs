use std::sync::Arc;

use anyhow::Context;
use arc_swap::{ArcSwap, ArcSwapOption};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::config::EventBookingsConfig;
use crate::contract::client::EventBookingsApi;
use crate::domain::ports::SystemClock;
use crate::domain::repo::Repositories;
use crate::domain::service::Service;
use crate::gateways::local::EventBookingsLocalClient;
use crate::infra::events::TracingEventPublisher;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{
    SeaOrmBookingsRepository, SeaOrmDirectory, SeaOrmEventsRepository, SeaOrmGuestsRepository,
};

/// Booking engine module: owns the domain service and hands out the local client.
pub struct EventBookings {
    config: ArcSwap<EventBookingsConfig>,
    service: ArcSwapOption<Service>,
}

impl Default for EventBookings {
    fn default() -> Self {
        Self {
            config: ArcSwap::from_pointee(EventBookingsConfig::default()),
            service: ArcSwapOption::from(None),
        }
    }
}

impl EventBookings {
    pub const NAME: &'static str = "event_bookings";

    /// Apply pending schema migrations.
    pub async fn migrate(&self, db: &db::DbHandle) -> anyhow::Result<()> {
        info!("Running event_bookings migrations");
        Migrator::up(&db.sea(), None)
            .await
            .context("event_bookings migrations failed")?;
        Ok(())
    }

    /// Wire SeaORM repositories into a fresh domain service.
    pub async fn init(&self, db: &db::DbHandle, cfg: EventBookingsConfig) -> anyhow::Result<()> {
        cfg.validate().context("invalid event_bookings config")?;
        debug!(?cfg, "Loaded event_bookings configuration");

        let conn = db.sea();
        let repos = Repositories {
            directory: Arc::new(SeaOrmDirectory::new(conn.clone())),
            events: Arc::new(SeaOrmEventsRepository::new(conn.clone())),
            bookings: Arc::new(SeaOrmBookingsRepository::new(conn.clone())),
            guests: Arc::new(SeaOrmGuestsRepository::new(conn)),
        };
        let service = Service::new(
            repos,
            Arc::new(TracingEventPublisher),
            Arc::new(SystemClock),
            (&cfg).into(),
        );

        self.service.store(Some(Arc::new(service)));
        self.config.store(Arc::new(cfg));
        info!("event_bookings module initialized");
        Ok(())
    }

    pub fn config(&self) -> Arc<EventBookingsConfig> {
        self.config.load_full()
    }

    pub fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("event_bookings is not initialized"))
    }

    /// Client for in-process consumers.
    pub fn client(&self) -> anyhow::Result<Arc<dyn EventBookingsApi>> {
        Ok(Arc::new(EventBookingsLocalClient::new(self.service()?)))
    }
}
