use tracing::info;

use crate::domain::events::BookingDomainEvent;
use crate::domain::ports::EventPublisher;

/// Publishes domain events to the log under the `event_bookings::events` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl EventPublisher<BookingDomainEvent> for TracingEventPublisher {
    fn publish(&self, event: &BookingDomainEvent) {
        info!(target: "event_bookings::events", event = event.name(), details = ?event, "domain event");
    }
}
