use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{BookingStatus, RsvpStatus};

/// Transport-agnostic domain event, published after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingDomainEvent {
    EventCreated {
        id: Uuid,
        planner_id: Uuid,
        at: DateTime<Utc>,
    },
    EventUpdated {
        id: Uuid,
        at: DateTime<Utc>,
    },
    EventDeleted {
        id: Uuid,
        at: DateTime<Utc>,
    },
    BookingCreated {
        id: Uuid,
        event_id: Uuid,
        vendor_id: Uuid,
        at: DateTime<Utc>,
    },
    BookingStatusChanged {
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTime<Utc>,
    },
    BookingDeleted {
        id: Uuid,
        at: DateTime<Utc>,
    },
    GuestAdded {
        id: Uuid,
        event_id: Uuid,
        at: DateTime<Utc>,
    },
    GuestUpdated {
        id: Uuid,
        at: DateTime<Utc>,
    },
    GuestRemoved {
        id: Uuid,
        event_id: Uuid,
        at: DateTime<Utc>,
    },
    RsvpChanged {
        id: Uuid,
        from: RsvpStatus,
        to: RsvpStatus,
        at: DateTime<Utc>,
    },
}

impl BookingDomainEvent {
    /// Stable event name for logs and transports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EventCreated { .. } => "event.created",
            Self::EventUpdated { .. } => "event.updated",
            Self::EventDeleted { .. } => "event.deleted",
            Self::BookingCreated { .. } => "booking.created",
            Self::BookingStatusChanged { .. } => "booking.status_changed",
            Self::BookingDeleted { .. } => "booking.deleted",
            Self::GuestAdded { .. } => "guest.added",
            Self::GuestUpdated { .. } => "guest.updated",
            Self::GuestRemoved { .. } => "guest.removed",
            Self::RsvpChanged { .. } => "guest.rsvp_changed",
        }
    }
}
