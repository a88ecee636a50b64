use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{Event, Guest, GuestPatch, NewGuest, RsvpStatus};
use crate::domain::error::DomainError;
use crate::domain::events::BookingDomainEvent;
use crate::domain::gate;
use crate::domain::identity::resolve_actor;
use crate::domain::ports::{Clock, EventPublisher};
use crate::domain::repo::{Constraint, GuestChanges, RepoError, Repositories};
use crate::domain::service::ServiceConfig;
use crate::domain::validation;

/// Guest invitations and RSVP state of events.
#[derive(Clone)]
pub struct GuestTracker {
    repos: Repositories,
    events: Arc<dyn EventPublisher<BookingDomainEvent>>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl GuestTracker {
    pub fn new(
        repos: Repositories,
        events: Arc<dyn EventPublisher<BookingDomainEvent>>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repos,
            events,
            clock,
            config,
        }
    }

    #[instrument(
        name = "event_bookings.guests.add_guest",
        skip(self, new_guest),
        fields(event_id = %event_id, acting_user = %acting_user)
    )]
    pub async fn add_guest(
        &self,
        event_id: Uuid,
        new_guest: NewGuest,
        acting_user: Uuid,
    ) -> Result<Guest, DomainError> {
        info!("Adding guest");

        let name = validation::required_text(
            "name",
            &new_guest.name,
            self.config.max_guest_name_length,
        )?;
        let email = validation::email(&new_guest.email, self.config.max_email_length)?;
        let phone = validation::optional_text(
            "phone",
            new_guest.phone.as_deref(),
            self.config.max_phone_length,
        )?;
        let dietary_restrictions = validation::optional_text(
            "dietary_restrictions",
            new_guest.dietary_restrictions.as_deref(),
            self.config.max_dietary_length,
        )?;

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let event = self.load_event(event_id).await?;
        gate::ensure(gate::owns_event(&actor, &event), &actor)?;

        if self.repos.guests.email_taken(event_id, &email).await? {
            return Err(DomainError::duplicate_guest(event_id, email));
        }

        let user_id = self.linked_user(&email).await?;
        let now = self.clock.now();
        let guest = Guest {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            name,
            email,
            phone,
            rsvp_status: RsvpStatus::Invited,
            dietary_restrictions,
            created_at: now,
            updated_at: now,
        };

        match self.repos.guests.insert(guest.clone()).await {
            Ok(()) => {}
            Err(RepoError::Constraint(Constraint::GuestEventEmail)) => {
                warn!("guest with the same email added concurrently");
                return Err(DomainError::duplicate_guest(event_id, guest.email));
            }
            Err(e) => return Err(e.into()),
        }

        self.events.publish(&BookingDomainEvent::GuestAdded {
            id: guest.id,
            event_id,
            at: now,
        });

        info!(guest_id = %guest.id, linked = guest.user_id.is_some(), "Successfully added guest");
        Ok(guest)
    }

    #[instrument(name = "event_bookings.guests.get_guest", skip(self), fields(guest_id = %id))]
    pub async fn get_guest(&self, id: Uuid) -> Result<Guest, DomainError> {
        debug!("Getting guest by id");
        self.load_guest(id).await
    }

    #[instrument(
        name = "event_bookings.guests.update_guest",
        skip(self, patch),
        fields(guest_id = %id, acting_user = %acting_user)
    )]
    pub async fn update_guest(
        &self,
        id: Uuid,
        patch: GuestPatch,
        acting_user: Uuid,
    ) -> Result<Guest, DomainError> {
        info!("Updating guest");

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let current = self.load_guest(id).await?;
        let event = self.load_event(current.event_id).await?;
        gate::ensure(gate::owns_event(&actor, &event), &actor)?;

        let mut changes = GuestChanges::at(self.clock.now());
        if let Some(name) = patch.name {
            changes.name = Some(validation::required_text(
                "name",
                &name,
                self.config.max_guest_name_length,
            )?);
        }
        if let Some(email) = patch.email {
            let email = validation::email(&email, self.config.max_email_length)?;
            if email != current.email {
                if self.repos.guests.email_taken(current.event_id, &email).await? {
                    return Err(DomainError::duplicate_guest(current.event_id, email));
                }
                changes.user_id = Some(self.linked_user(&email).await?);
                changes.email = Some(email);
            }
        }
        if let Some(phone) = patch.phone {
            changes.phone = Some(validation::optional_text(
                "phone",
                Some(&phone),
                self.config.max_phone_length,
            )?);
        }
        if let Some(dietary) = patch.dietary_restrictions {
            changes.dietary_restrictions = Some(validation::optional_text(
                "dietary_restrictions",
                Some(&dietary),
                self.config.max_dietary_length,
            )?);
        }
        changes.rsvp_status = patch.rsvp_status;

        match self.repos.guests.update(id, &changes).await {
            Ok(true) => {}
            Ok(false) => return Err(DomainError::guest_not_found(id)),
            Err(RepoError::Constraint(Constraint::GuestEventEmail)) => {
                warn!("guest email taken concurrently");
                let email = changes.email.unwrap_or(current.email);
                return Err(DomainError::duplicate_guest(current.event_id, email));
            }
            Err(e) => return Err(e.into()),
        }

        // Untouched columns may have moved meanwhile (e.g. an RSVP answer).
        let updated = self.load_guest(id).await?;

        self.events.publish(&BookingDomainEvent::GuestUpdated {
            id,
            at: changes.updated_at,
        });
        if let Some(status) = changes.rsvp_status.filter(|s| *s != current.rsvp_status) {
            self.events.publish(&BookingDomainEvent::RsvpChanged {
                id,
                from: current.rsvp_status,
                to: status,
                at: changes.updated_at,
            });
        }

        info!("Successfully updated guest");
        Ok(updated)
    }

    #[instrument(
        name = "event_bookings.guests.remove_guest",
        skip(self),
        fields(guest_id = %id, acting_user = %acting_user)
    )]
    pub async fn remove_guest(&self, id: Uuid, acting_user: Uuid) -> Result<(), DomainError> {
        info!("Removing guest");

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let guest = self.load_guest(id).await?;
        let event = self.load_event(guest.event_id).await?;
        gate::ensure(gate::owns_event(&actor, &event), &actor)?;

        if !self.repos.guests.delete(id).await? {
            return Err(DomainError::guest_not_found(id));
        }

        self.events.publish(&BookingDomainEvent::GuestRemoved {
            id,
            event_id: guest.event_id,
            at: self.clock.now(),
        });

        info!("Successfully removed guest");
        Ok(())
    }

    /// RSVP write without an acting user. Any caller holding the guest id
    /// can move the guest between all four states; `respond_to_invitation`
    /// is the ownership-checked variant.
    #[instrument(
        name = "event_bookings.guests.set_rsvp_status",
        skip(self),
        fields(guest_id = %id, status = %status)
    )]
    pub async fn set_rsvp_status(&self, id: Uuid, status: RsvpStatus) -> Result<Guest, DomainError> {
        info!("Setting RSVP status");
        let guest = self.load_guest(id).await?;
        self.write_rsvp(guest, status).await
    }

    #[instrument(
        name = "event_bookings.guests.respond_to_invitation",
        skip(self),
        fields(guest_id = %id, status = %status, acting_user = %acting_user)
    )]
    pub async fn respond_to_invitation(
        &self,
        id: Uuid,
        status: RsvpStatus,
        acting_user: Uuid,
    ) -> Result<Guest, DomainError> {
        info!("Responding to invitation");

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let guest = self.load_guest(id).await?;
        let event = self.load_event(guest.event_id).await?;
        gate::ensure(gate::can_respond_to_invitation(&actor, &event, &guest), &actor)?;

        self.write_rsvp(guest, status).await
    }

    #[instrument(name = "event_bookings.guests.list_guests", skip(self), fields(event_id = %event_id))]
    pub async fn list_guests(
        &self,
        event_id: Uuid,
        status: Option<RsvpStatus>,
    ) -> Result<Vec<Guest>, DomainError> {
        debug!("Listing guests");
        self.load_event(event_id).await?;
        let guests = self.repos.guests.list_by_event(event_id, status).await?;
        debug!("Successfully listed {} guests", guests.len());
        Ok(guests)
    }

    #[instrument(
        name = "event_bookings.guests.guest_invitations",
        skip(self),
        fields(acting_user = %acting_user)
    )]
    pub async fn invitations(&self, acting_user: Uuid) -> Result<Vec<Guest>, DomainError> {
        debug!("Listing invitations of the acting user");
        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        Ok(self.repos.guests.list_by_user(actor.user_id).await?)
    }

    // --- helpers ---

    async fn write_rsvp(&self, mut guest: Guest, status: RsvpStatus) -> Result<Guest, DomainError> {
        let from = guest.rsvp_status;
        let now = self.clock.now();
        if !self.repos.guests.set_rsvp(guest.id, status, now).await? {
            return Err(DomainError::guest_not_found(guest.id));
        }
        guest.rsvp_status = status;
        guest.updated_at = now;

        if from != status {
            self.events.publish(&BookingDomainEvent::RsvpChanged {
                id: guest.id,
                from,
                to: status,
                at: now,
            });
        }

        info!(%from, to = %status, "RSVP status stored");
        Ok(guest)
    }

    async fn linked_user(&self, email: &str) -> Result<Option<Uuid>, DomainError> {
        Ok(self
            .repos
            .directory
            .find_user_by_email(email)
            .await?
            .map(|u| u.id))
    }

    async fn load_guest(&self, id: Uuid) -> Result<Guest, DomainError> {
        self.repos
            .guests
            .find(id)
            .await?
            .ok_or_else(|| DomainError::guest_not_found(id))
    }

    async fn load_event(&self, id: Uuid) -> Result<Event, DomainError> {
        self.repos
            .events
            .find(id)
            .await?
            .ok_or_else(|| DomainError::event_not_found(id))
    }
}
