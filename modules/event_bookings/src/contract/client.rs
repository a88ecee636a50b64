use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::{
    error::EventBookingsError,
    model::{
        Booking, BookingFilter, BookingScope, BookingStats, BookingStatus, DateRange, Event,
        EventPatch, Guest, GuestPatch, GuestStats, NewBooking, NewEvent, NewGuest, RsvpStatus,
    },
};

/// Public API trait for the event_bookings module that other modules can use.
///
/// Mutations take the id of the acting user; reads are open.
#[async_trait]
pub trait EventBookingsApi: Send + Sync {
    // --- events ---

    /// Create an event owned by the acting user (planner or vendor role required)
    async fn create_event(&self, new_event: NewEvent, acting_user: Uuid)
        -> Result<Event, EventBookingsError>;

    async fn get_event(&self, id: Uuid) -> Result<Event, EventBookingsError>;

    /// Planner-only; the date is frozen while vendors are committed to it
    async fn update_event(
        &self,
        id: Uuid,
        patch: EventPatch,
        acting_user: Uuid,
    ) -> Result<Event, EventBookingsError>;

    /// Planner-only; refused while non-cancelled bookings exist
    async fn delete_event(&self, id: Uuid, acting_user: Uuid) -> Result<(), EventBookingsError>;

    // --- bookings ---

    async fn create_booking(
        &self,
        new_booking: NewBooking,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError>;

    async fn get_booking(&self, id: Uuid) -> Result<Booking, EventBookingsError>;

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError>;

    async fn confirm_booking(&self, id: Uuid, acting_user: Uuid)
        -> Result<Booking, EventBookingsError>;

    async fn cancel_booking(&self, id: Uuid, acting_user: Uuid)
        -> Result<Booking, EventBookingsError>;

    async fn complete_booking(&self, id: Uuid, acting_user: Uuid)
        -> Result<Booking, EventBookingsError>;

    async fn update_booking_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError>;

    async fn delete_booking(&self, id: Uuid, acting_user: Uuid) -> Result<(), EventBookingsError>;

    async fn list_bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, EventBookingsError>;

    /// Confirmed bookings on or after `today`, soonest first
    async fn upcoming_bookings(
        &self,
        scope: BookingScope,
        today: NaiveDate,
    ) -> Result<Vec<Booking>, EventBookingsError>;

    async fn booking_statistics(&self, scope: BookingScope)
        -> Result<BookingStats, EventBookingsError>;

    // --- availability ---

    async fn is_vendor_available(
        &self,
        vendor_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, EventBookingsError>;

    async fn unavailable_dates(
        &self,
        vendor_id: Uuid,
        range: DateRange,
    ) -> Result<BTreeSet<NaiveDate>, EventBookingsError>;

    // --- guests ---

    async fn add_guest(
        &self,
        event_id: Uuid,
        new_guest: NewGuest,
        acting_user: Uuid,
    ) -> Result<Guest, EventBookingsError>;

    async fn get_guest(&self, id: Uuid) -> Result<Guest, EventBookingsError>;

    async fn update_guest(
        &self,
        id: Uuid,
        patch: GuestPatch,
        acting_user: Uuid,
    ) -> Result<Guest, EventBookingsError>;

    async fn remove_guest(&self, id: Uuid, acting_user: Uuid) -> Result<(), EventBookingsError>;

    /// Unauthenticated RSVP write; prefer `respond_to_invitation`
    async fn set_rsvp_status(&self, id: Uuid, status: RsvpStatus)
        -> Result<Guest, EventBookingsError>;

    /// RSVP by the invited user or the event's planner
    async fn respond_to_invitation(
        &self,
        id: Uuid,
        status: RsvpStatus,
        acting_user: Uuid,
    ) -> Result<Guest, EventBookingsError>;

    async fn list_guests(
        &self,
        event_id: Uuid,
        rsvp_status: Option<RsvpStatus>,
    ) -> Result<Vec<Guest>, EventBookingsError>;

    /// Guest records linked to the acting user
    async fn guest_invitations(&self, acting_user: Uuid) -> Result<Vec<Guest>, EventBookingsError>;

    async fn event_statistics(&self, event_id: Uuid) -> Result<GuestStats, EventBookingsError>;
}
