use tracing::{debug, instrument};
use uuid::Uuid;

use crate::contract::model::{BookingScope, BookingStats, GuestStats};
use crate::domain::error::DomainError;
use crate::domain::repo::Repositories;

/// Read-only counts by status.
#[derive(Clone)]
pub struct StatisticsAggregator {
    repos: Repositories,
}

impl StatisticsAggregator {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    #[instrument(name = "event_bookings.stats.booking_statistics", skip(self))]
    pub async fn booking_statistics(&self, scope: BookingScope) -> Result<BookingStats, DomainError> {
        debug!("Counting bookings by status");
        match scope {
            BookingScope::Vendor(id) => {
                self.repos
                    .directory
                    .find_vendor(id)
                    .await?
                    .ok_or_else(|| DomainError::vendor_not_found(id))?;
            }
            BookingScope::Planner(id) => {
                self.repos
                    .directory
                    .find_user(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("User", id))?;
            }
        }
        let stats = self.repos.bookings.count_by_status(scope).await?;
        debug!(total = stats.total, "booking statistics computed");
        Ok(stats)
    }

    #[instrument(name = "event_bookings.stats.event_statistics", skip(self), fields(event_id = %event_id))]
    pub async fn event_statistics(&self, event_id: Uuid) -> Result<GuestStats, DomainError> {
        debug!("Counting guests by RSVP status");
        self.repos
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| DomainError::event_not_found(event_id))?;
        let stats = self.repos.guests.count_by_status(event_id).await?;
        debug!(total = stats.total, "guest statistics computed");
        Ok(stats)
    }
}
