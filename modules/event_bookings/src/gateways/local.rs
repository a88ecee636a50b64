use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::{
    client::EventBookingsApi,
    error::EventBookingsError,
    model::{
        Booking, BookingFilter, BookingScope, BookingStats, BookingStatus, DateRange, Event,
        EventPatch, Guest, GuestPatch, GuestStats, NewBooking, NewEvent, NewGuest, RsvpStatus,
    },
};
use crate::domain::service::Service;

/// Local implementation of the EventBookingsApi trait that delegates to the domain service
pub struct EventBookingsLocalClient {
    service: Arc<Service>,
}

impl EventBookingsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventBookingsApi for EventBookingsLocalClient {
    async fn create_event(
        &self,
        new_event: NewEvent,
        acting_user: Uuid,
    ) -> Result<Event, EventBookingsError> {
        self.service
            .planner()
            .create_event(new_event, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn get_event(&self, id: Uuid) -> Result<Event, EventBookingsError> {
        self.service.planner().get_event(id).await.map_err(Into::into)
    }

    async fn update_event(
        &self,
        id: Uuid,
        patch: EventPatch,
        acting_user: Uuid,
    ) -> Result<Event, EventBookingsError> {
        self.service
            .planner()
            .update_event(id, patch, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn delete_event(&self, id: Uuid, acting_user: Uuid) -> Result<(), EventBookingsError> {
        self.service
            .planner()
            .delete_event(id, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn create_booking(
        &self,
        new_booking: NewBooking,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError> {
        self.service
            .lifecycle()
            .create_booking(new_booking, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Booking, EventBookingsError> {
        self.service.lifecycle().get_booking(id).await.map_err(Into::into)
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError> {
        self.service
            .lifecycle()
            .update_status(id, status, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn confirm_booking(
        &self,
        id: Uuid,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError> {
        self.service
            .lifecycle()
            .confirm(id, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn cancel_booking(
        &self,
        id: Uuid,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError> {
        self.service
            .lifecycle()
            .cancel(id, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn complete_booking(
        &self,
        id: Uuid,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError> {
        self.service
            .lifecycle()
            .complete(id, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn update_booking_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
        acting_user: Uuid,
    ) -> Result<Booking, EventBookingsError> {
        self.service
            .lifecycle()
            .update_notes(id, notes, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn delete_booking(&self, id: Uuid, acting_user: Uuid) -> Result<(), EventBookingsError> {
        self.service
            .lifecycle()
            .delete_booking(id, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn list_bookings(
        &self,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, EventBookingsError> {
        self.service
            .lifecycle()
            .list_bookings(filter)
            .await
            .map_err(Into::into)
    }

    async fn upcoming_bookings(
        &self,
        scope: BookingScope,
        today: NaiveDate,
    ) -> Result<Vec<Booking>, EventBookingsError> {
        self.service
            .lifecycle()
            .upcoming(scope, today)
            .await
            .map_err(Into::into)
    }

    async fn booking_statistics(
        &self,
        scope: BookingScope,
    ) -> Result<BookingStats, EventBookingsError> {
        self.service
            .stats()
            .booking_statistics(scope)
            .await
            .map_err(Into::into)
    }

    async fn is_vendor_available(
        &self,
        vendor_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, EventBookingsError> {
        self.service
            .availability()
            .is_available(vendor_id, date)
            .await
            .map_err(Into::into)
    }

    async fn unavailable_dates(
        &self,
        vendor_id: Uuid,
        range: DateRange,
    ) -> Result<BTreeSet<NaiveDate>, EventBookingsError> {
        self.service
            .availability()
            .unavailable_dates(vendor_id, range)
            .await
            .map_err(Into::into)
    }

    async fn add_guest(
        &self,
        event_id: Uuid,
        new_guest: NewGuest,
        acting_user: Uuid,
    ) -> Result<Guest, EventBookingsError> {
        self.service
            .guests()
            .add_guest(event_id, new_guest, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn get_guest(&self, id: Uuid) -> Result<Guest, EventBookingsError> {
        self.service.guests().get_guest(id).await.map_err(Into::into)
    }

    async fn update_guest(
        &self,
        id: Uuid,
        patch: GuestPatch,
        acting_user: Uuid,
    ) -> Result<Guest, EventBookingsError> {
        self.service
            .guests()
            .update_guest(id, patch, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn remove_guest(&self, id: Uuid, acting_user: Uuid) -> Result<(), EventBookingsError> {
        self.service
            .guests()
            .remove_guest(id, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn set_rsvp_status(
        &self,
        id: Uuid,
        status: RsvpStatus,
    ) -> Result<Guest, EventBookingsError> {
        self.service
            .guests()
            .set_rsvp_status(id, status)
            .await
            .map_err(Into::into)
    }

    async fn respond_to_invitation(
        &self,
        id: Uuid,
        status: RsvpStatus,
        acting_user: Uuid,
    ) -> Result<Guest, EventBookingsError> {
        self.service
            .guests()
            .respond_to_invitation(id, status, acting_user)
            .await
            .map_err(Into::into)
    }

    async fn list_guests(
        &self,
        event_id: Uuid,
        rsvp_status: Option<RsvpStatus>,
    ) -> Result<Vec<Guest>, EventBookingsError> {
        self.service
            .guests()
            .list_guests(event_id, rsvp_status)
            .await
            .map_err(Into::into)
    }

    async fn guest_invitations(&self, acting_user: Uuid) -> Result<Vec<Guest>, EventBookingsError> {
        self.service
            .guests()
            .invitations(acting_user)
            .await
            .map_err(Into::into)
    }

    async fn event_statistics(&self, event_id: Uuid) -> Result<GuestStats, EventBookingsError> {
        self.service
            .stats()
            .event_statistics(event_id)
            .await
            .map_err(Into::into)
    }
}
