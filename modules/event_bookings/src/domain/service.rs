use std::sync::Arc;

use crate::domain::availability::AvailabilityIndex;
use crate::domain::events::BookingDomainEvent;
use crate::domain::guests::GuestTracker;
use crate::domain::lifecycle::BookingLifecycle;
use crate::domain::planning::EventPlanner;
use crate::domain::ports::{Clock, EventPublisher};
use crate::domain::repo::Repositories;
use crate::domain::stats::StatisticsAggregator;

/// Domain service: the booking engine's components wired to the same ports.
/// Depends only on the repository ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    planner: EventPlanner,
    lifecycle: BookingLifecycle,
    availability: AvailabilityIndex,
    guests: GuestTracker,
    stats: StatisticsAggregator,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_notes_length: usize,
    pub max_guest_name_length: usize,
    pub max_email_length: usize,
    pub max_phone_length: usize,
    pub max_dietary_length: usize,
    pub max_title_length: usize,
    pub max_location_length: usize,
    pub max_description_length: usize,
    pub max_availability_window_days: u32,
    pub default_list_limit: u64,
    pub max_list_limit: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_notes_length: 1000,
            max_guest_name_length: 255,
            max_email_length: 254,
            max_phone_length: 20,
            max_dietary_length: 500,
            max_title_length: 255,
            max_location_length: 255,
            max_description_length: 5000,
            max_availability_window_days: 366,
            default_list_limit: 100,
            max_list_limit: 1000,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repos: Repositories,
        events: Arc<dyn EventPublisher<BookingDomainEvent>>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        let availability = AvailabilityIndex::new(
            repos.bookings.clone(),
            repos.directory.clone(),
            config.max_availability_window_days,
        );
        Self {
            planner: EventPlanner::new(repos.clone(), events.clone(), clock.clone(), config.clone()),
            lifecycle: BookingLifecycle::new(
                repos.clone(),
                availability.clone(),
                events.clone(),
                clock.clone(),
                config.clone(),
            ),
            guests: GuestTracker::new(repos.clone(), events, clock, config),
            stats: StatisticsAggregator::new(repos),
            availability,
        }
    }

    pub fn planner(&self) -> &EventPlanner {
        &self.planner
    }

    pub fn lifecycle(&self) -> &BookingLifecycle {
        &self.lifecycle
    }

    pub fn availability(&self) -> &AvailabilityIndex {
        &self.availability
    }

    pub fn guests(&self) -> &GuestTracker {
        &self.guests
    }

    pub fn stats(&self) -> &StatisticsAggregator {
        &self.stats
    }
}
