//! Shared fixtures: a migrated SQLite database, the wired service and seed helpers.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use db::{ConnectOpts, DbHandle};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use event_bookings::contract::client::EventBookingsApi;
use event_bookings::contract::model::{
    Event, NewBooking, NewEvent, NewGuest, ServiceOffering, UserAccount, VendorProfile,
};
use event_bookings::domain::events::BookingDomainEvent;
use event_bookings::domain::ports::{EventPublisher, SystemClock};
use event_bookings::domain::repo::Repositories;
use event_bookings::domain::service::{Service, ServiceConfig};
use event_bookings::gateways::local::EventBookingsLocalClient;
use event_bookings::infra::storage::migrations::Migrator;
use event_bookings::infra::storage::{
    SeaOrmBookingsRepository, SeaOrmDirectory, SeaOrmEventsRepository, SeaOrmGuestsRepository,
};

/// Collects published domain events.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<BookingDomainEvent>>,
}

impl RecordingPublisher {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.name()).collect()
    }

    pub fn all(&self) -> Vec<BookingDomainEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher<BookingDomainEvent> for RecordingPublisher {
    fn publish(&self, event: &BookingDomainEvent) {
        self.events.lock().push(event.clone());
    }
}

pub struct Harness {
    pub db: DbHandle,
    pub directory: SeaOrmDirectory<DatabaseConnection>,
    pub repos: Repositories,
    pub service: Arc<Service>,
    pub client: Arc<dyn EventBookingsApi>,
    pub published: Arc<RecordingPublisher>,
}

/// Fresh in-memory database per test.
pub async fn harness() -> Harness {
    harness_with("sqlite::memory:", ServiceConfig::default()).await
}

pub async fn harness_with(dsn: &str, config: ServiceConfig) -> Harness {
    let opts = ConnectOpts {
        sqlite_busy_timeout: Some(std::time::Duration::from_secs(5)),
        ..Default::default()
    };
    let db = DbHandle::connect(dsn, opts)
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db.sea(), None)
        .await
        .expect("Failed to run migrations");

    let conn = db.sea();
    let repos = Repositories {
        directory: Arc::new(SeaOrmDirectory::new(conn.clone())),
        events: Arc::new(SeaOrmEventsRepository::new(conn.clone())),
        bookings: Arc::new(SeaOrmBookingsRepository::new(conn.clone())),
        guests: Arc::new(SeaOrmGuestsRepository::new(conn.clone())),
    };
    let published = Arc::new(RecordingPublisher::default());
    let service = Arc::new(Service::new(
        repos.clone(),
        published.clone(),
        Arc::new(SystemClock),
        config,
    ));
    let client: Arc<dyn EventBookingsApi> = Arc::new(EventBookingsLocalClient::new(service.clone()));

    Harness {
        directory: SeaOrmDirectory::new(conn),
        db,
        repos,
        service,
        client,
        published,
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Noon UTC on the given day.
pub fn at_noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub struct SeededVendor {
    pub user: UserAccount,
    pub profile: VendorProfile,
    pub service: ServiceOffering,
}

impl Harness {
    pub async fn user(&self, email: &str, is_planner: bool, is_vendor: bool) -> UserAccount {
        let user = UserAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            is_planner,
            is_vendor,
        };
        self.directory.insert_user(&user).await.unwrap();
        user
    }

    pub async fn planner(&self, email: &str) -> UserAccount {
        self.user(email, true, false).await
    }

    pub async fn vendor(&self, email: &str, business: &str) -> SeededVendor {
        let user = self.user(email, false, true).await;
        let profile = VendorProfile {
            id: Uuid::new_v4(),
            user_id: user.id,
            business_name: business.to_string(),
            verified: true,
        };
        self.directory.insert_vendor(&profile).await.unwrap();
        let service = ServiceOffering {
            id: Uuid::new_v4(),
            vendor_id: profile.id,
            category_id: None,
            name: format!("{business} package"),
            price: Decimal::new(150_000, 2),
        };
        self.directory.insert_service(&service).await.unwrap();
        SeededVendor {
            user,
            profile,
            service,
        }
    }

    pub async fn event_on(&self, planner: &UserAccount, date: DateTime<Utc>) -> Event {
        self.client
            .create_event(
                NewEvent {
                    title: "Summer wedding".into(),
                    description: Some("Garden ceremony".into()),
                    date,
                    location: "Lakeside Hall".into(),
                },
                planner.id,
            )
            .await
            .unwrap()
    }

    pub async fn book(
        &self,
        planner: &UserAccount,
        event: &Event,
        vendor: &SeededVendor,
    ) -> event_bookings::contract::model::Booking {
        self.client
            .create_booking(
                NewBooking {
                    event_id: event.id,
                    vendor_id: vendor.profile.id,
                    service_id: vendor.service.id,
                    notes: None,
                },
                planner.id,
            )
            .await
            .unwrap()
    }
}

pub fn new_guest(name: &str, email: &str) -> NewGuest {
    NewGuest {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        dietary_restrictions: None,
    }
}
