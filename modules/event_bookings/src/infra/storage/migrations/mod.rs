use sea_orm_migration::prelude::*;

mod initial_001;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(initial_001::Migration)]
    }
}

/// Names of the unique indexes the repository maps to typed conflicts.
pub mod index {
    pub const BOOKING_EVENT_VENDOR: &str = "idx_bookings_event_vendor";
    pub const BOOKING_VENDOR_COMMITTED: &str = "idx_bookings_vendor_committed";
    pub const GUEST_EVENT_EMAIL: &str = "idx_guests_event_email";
}
