use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    Actor, Booking, BookingFilter, BookingScope, BookingStatus, Event, NewBooking, VendorProfile,
};
use crate::domain::availability::AvailabilityIndex;
use crate::domain::error::DomainError;
use crate::domain::events::BookingDomainEvent;
use crate::domain::gate;
use crate::domain::identity::resolve_actor;
use crate::domain::ports::{Clock, EventPublisher};
use crate::domain::repo::{Constraint, RepoError, Repositories};
use crate::domain::service::ServiceConfig;
use crate::domain::validation;

/// Allowed status moves. Either party of the booking may drive any of them.
pub fn check_transition(from: BookingStatus, to: BookingStatus) -> Result<(), DomainError> {
    use BookingStatus::*;
    match (from, to) {
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        | (Confirmed, Completed) => Ok(()),
        _ => Err(DomainError::invalid_transition(from, to)),
    }
}

/// Statuses in which a booking may be deleted.
pub const DELETABLE: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Cancelled];

/// State machine of a single booking: creation, transitions, notes, deletion and listings.
#[derive(Clone)]
pub struct BookingLifecycle {
    repos: Repositories,
    availability: AvailabilityIndex,
    events: Arc<dyn EventPublisher<BookingDomainEvent>>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl BookingLifecycle {
    pub fn new(
        repos: Repositories,
        availability: AvailabilityIndex,
        events: Arc<dyn EventPublisher<BookingDomainEvent>>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repos,
            availability,
            events,
            clock,
            config,
        }
    }

    #[instrument(
        name = "event_bookings.lifecycle.create_booking",
        skip(self, new_booking),
        fields(
            event_id = %new_booking.event_id,
            vendor_id = %new_booking.vendor_id,
            acting_user = %acting_user
        )
    )]
    pub async fn create_booking(
        &self,
        new_booking: NewBooking,
        acting_user: Uuid,
    ) -> Result<Booking, DomainError> {
        info!("Creating booking");

        let notes = validation::optional_text(
            "notes",
            new_booking.notes.as_deref(),
            self.config.max_notes_length,
        )?;
        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;

        let event = self.load_event(new_booking.event_id).await?;
        let vendor = self.load_vendor(new_booking.vendor_id).await?;
        gate::ensure(gate::owns_event(&actor, &event), &actor)?;

        let service = self
            .repos
            .directory
            .find_service(new_booking.service_id)
            .await?
            .ok_or_else(|| DomainError::service_not_found(new_booking.service_id))?;
        if service.vendor_id != vendor.id {
            return Err(DomainError::validation(
                "service_id",
                "service is not offered by this vendor",
            ));
        }

        if self
            .repos
            .bookings
            .exists_for_event_vendor(event.id, vendor.id)
            .await?
        {
            return Err(DomainError::already_booked(event.id, vendor.id));
        }
        let date = event.calendar_date();
        self.availability.ensure_available(vendor.id, date).await?;

        let now = self.clock.now();
        let booking = Booking {
            id: Uuid::new_v4(),
            event_id: event.id,
            vendor_id: vendor.id,
            service_id: service.id,
            status: BookingStatus::Pending,
            notes,
            event_date: date,
            created_at: now,
            updated_at: now,
        };

        match self.repos.bookings.insert(booking.clone()).await {
            Ok(()) => {}
            Err(RepoError::Constraint(Constraint::BookingEventVendor)) => {
                warn!("concurrent booking for the same event and vendor");
                return Err(DomainError::already_booked(event.id, vendor.id));
            }
            Err(e) => return Err(e.into()),
        }

        self.events.publish(&BookingDomainEvent::BookingCreated {
            id: booking.id,
            event_id: booking.event_id,
            vendor_id: booking.vendor_id,
            at: now,
        });

        info!(booking_id = %booking.id, "Successfully created booking");
        Ok(booking)
    }

    #[instrument(name = "event_bookings.lifecycle.get_booking", skip(self), fields(booking_id = %id))]
    pub async fn get_booking(&self, id: Uuid) -> Result<Booking, DomainError> {
        debug!("Getting booking by id");
        self.load_booking(id).await
    }

    #[instrument(
        name = "event_bookings.lifecycle.update_status",
        skip(self),
        fields(booking_id = %id, to = %next, acting_user = %acting_user)
    )]
    pub async fn update_status(
        &self,
        id: Uuid,
        next: BookingStatus,
        acting_user: Uuid,
    ) -> Result<Booking, DomainError> {
        info!("Updating booking status");

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let mut booking = self.load_booking(id).await?;
        self.ensure_party(&actor, &booking).await?;

        let from = booking.status;
        check_transition(from, next)?;
        if next == BookingStatus::Confirmed {
            self.availability
                .ensure_available(booking.vendor_id, booking.event_date)
                .await?;
        }

        let now = self.clock.now();
        match self.repos.bookings.transition(id, from, next, now).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(%from, "booking changed before the status write");
                return Err(DomainError::concurrent_update("Booking", id));
            }
            Err(RepoError::Constraint(Constraint::VendorCommittedDate)) => {
                warn!(
                    vendor_id = %booking.vendor_id,
                    date = %booking.event_date,
                    "vendor date taken by a concurrent confirmation"
                );
                return Err(DomainError::vendor_unavailable(
                    booking.vendor_id,
                    booking.event_date,
                ));
            }
            Err(e) => return Err(e.into()),
        }

        booking.status = next;
        booking.updated_at = now;

        self.events.publish(&BookingDomainEvent::BookingStatusChanged {
            id,
            from,
            to: next,
            at: now,
        });

        info!(%from, "Successfully updated booking status");
        Ok(booking)
    }

    pub async fn confirm(&self, id: Uuid, acting_user: Uuid) -> Result<Booking, DomainError> {
        self.update_status(id, BookingStatus::Confirmed, acting_user).await
    }

    pub async fn cancel(&self, id: Uuid, acting_user: Uuid) -> Result<Booking, DomainError> {
        self.update_status(id, BookingStatus::Cancelled, acting_user).await
    }

    pub async fn complete(&self, id: Uuid, acting_user: Uuid) -> Result<Booking, DomainError> {
        self.update_status(id, BookingStatus::Completed, acting_user).await
    }

    #[instrument(
        name = "event_bookings.lifecycle.update_notes",
        skip(self, notes),
        fields(booking_id = %id, acting_user = %acting_user)
    )]
    pub async fn update_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
        acting_user: Uuid,
    ) -> Result<Booking, DomainError> {
        info!("Updating booking notes");

        let notes =
            validation::optional_text("notes", notes.as_deref(), self.config.max_notes_length)?;
        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let mut booking = self.load_booking(id).await?;
        self.ensure_party(&actor, &booking).await?;

        let now = self.clock.now();
        if !self
            .repos
            .bookings
            .update_notes(id, notes.clone(), now)
            .await?
        {
            return Err(DomainError::booking_not_found(id));
        }

        booking.notes = notes;
        booking.updated_at = now;
        info!("Successfully updated booking notes");
        Ok(booking)
    }

    #[instrument(
        name = "event_bookings.lifecycle.delete_booking",
        skip(self),
        fields(booking_id = %id, acting_user = %acting_user)
    )]
    pub async fn delete_booking(&self, id: Uuid, acting_user: Uuid) -> Result<(), DomainError> {
        info!("Deleting booking");

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let booking = self.load_booking(id).await?;
        let event = self.load_event(booking.event_id).await?;
        gate::ensure(gate::owns_event(&actor, &event), &actor)?;

        if !DELETABLE.contains(&booking.status) {
            return Err(DomainError::invalid_operation(format!(
                "cannot delete a {} booking; only PENDING or CANCELLED bookings can be deleted",
                booking.status
            )));
        }

        if !self.repos.bookings.delete_if_status(id, &DELETABLE).await? {
            warn!("booking changed before delete");
            return Err(DomainError::concurrent_update("Booking", id));
        }

        self.events.publish(&BookingDomainEvent::BookingDeleted {
            id,
            at: self.clock.now(),
        });

        info!("Successfully deleted booking");
        Ok(())
    }

    #[instrument(name = "event_bookings.lifecycle.list_bookings", skip(self))]
    pub async fn list_bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, DomainError> {
        debug!("Listing bookings");

        if let Some(range) = filter.date_range {
            if range.from > range.to {
                return Err(DomainError::validation(
                    "date_range",
                    format!("start {} is after end {}", range.from, range.to),
                ));
            }
        }
        let limit = match filter.limit {
            Some(0) => return Err(DomainError::validation("limit", "must be positive")),
            Some(n) => n.min(self.config.max_list_limit),
            None => self.config.default_list_limit,
        };
        let filter = BookingFilter {
            limit: Some(limit),
            offset: Some(filter.offset.unwrap_or(0)),
            ..filter
        };

        let bookings = self.repos.bookings.list(&filter).await?;
        debug!("Successfully listed {} bookings", bookings.len());
        Ok(bookings)
    }

    #[instrument(name = "event_bookings.lifecycle.upcoming_bookings", skip(self))]
    pub async fn upcoming(
        &self,
        scope: BookingScope,
        today: NaiveDate,
    ) -> Result<Vec<Booking>, DomainError> {
        debug!("Listing upcoming bookings");
        let bookings = self.repos.bookings.upcoming(scope, today).await?;
        debug!("Found {} upcoming bookings", bookings.len());
        Ok(bookings)
    }

    // --- helpers ---

    async fn ensure_party(&self, actor: &Actor, booking: &Booking) -> Result<(), DomainError> {
        let event = self.load_event(booking.event_id).await?;
        let vendor = self.load_vendor(booking.vendor_id).await?;
        gate::ensure(gate::can_act_on_booking(actor, &event, &vendor), actor)
    }

    async fn load_booking(&self, id: Uuid) -> Result<Booking, DomainError> {
        self.repos
            .bookings
            .find(id)
            .await?
            .ok_or_else(|| DomainError::booking_not_found(id))
    }

    async fn load_event(&self, id: Uuid) -> Result<Event, DomainError> {
        self.repos
            .events
            .find(id)
            .await?
            .ok_or_else(|| DomainError::event_not_found(id))
    }

    async fn load_vendor(&self, id: Uuid) -> Result<VendorProfile, DomainError> {
        self.repos
            .directory
            .find_vendor(id)
            .await?
            .ok_or_else(|| DomainError::vendor_not_found(id))
    }
}
