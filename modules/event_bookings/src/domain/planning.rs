use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{Event, EventPatch, NewEvent};
use crate::domain::error::DomainError;
use crate::domain::events::BookingDomainEvent;
use crate::domain::gate;
use crate::domain::identity::resolve_actor;
use crate::domain::ports::{Clock, EventPublisher};
use crate::domain::repo::{EventRemoval, Repositories, Reschedule};
use crate::domain::service::ServiceConfig;
use crate::domain::validation;

/// Events owned by planners: the aggregate bookings and guests hang off.
#[derive(Clone)]
pub struct EventPlanner {
    repos: Repositories,
    events: Arc<dyn EventPublisher<BookingDomainEvent>>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl EventPlanner {
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
        name = "event_bookings.planning.create_event",
        skip(self, new_event),
        fields(date = %new_event.date, acting_user = %acting_user)
    )]
    pub async fn create_event(
        &self,
        new_event: NewEvent,
        acting_user: Uuid,
    ) -> Result<Event, DomainError> {
        info!("Creating event");

        let title = validation::required_text("title", &new_event.title, self.config.max_title_length)?;
        let location = validation::required_text(
            "location",
            &new_event.location,
            self.config.max_location_length,
        )?;
        let description = validation::optional_text(
            "description",
            new_event.description.as_deref(),
            self.config.max_description_length,
        )?;

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        gate::ensure(gate::can_create_event(&actor), &actor)?;

        let now = self.clock.now();
        let event = Event {
            id: Uuid::new_v4(),
            planner_id: actor.user_id,
            title,
            description,
            date: new_event.date,
            location,
            created_at: now,
            updated_at: now,
        };
        self.repos.events.insert(event.clone()).await?;

        self.events.publish(&BookingDomainEvent::EventCreated {
            id: event.id,
            planner_id: event.planner_id,
            at: now,
        });

        info!(event_id = %event.id, "Successfully created event");
        Ok(event)
    }

    #[instrument(name = "event_bookings.planning.get_event", skip(self), fields(event_id = %id))]
    pub async fn get_event(&self, id: Uuid) -> Result<Event, DomainError> {
        debug!("Getting event by id");
        self.repos
            .events
            .find(id)
            .await?
            .ok_or_else(|| DomainError::event_not_found(id))
    }

    #[instrument(
        name = "event_bookings.planning.update_event",
        skip(self, patch),
        fields(event_id = %id, acting_user = %acting_user)
    )]
    pub async fn update_event(
        &self,
        id: Uuid,
        patch: EventPatch,
        acting_user: Uuid,
    ) -> Result<Event, DomainError> {
        info!("Updating event");

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let mut current = self.get_event(id).await?;
        gate::ensure(gate::owns_event(&actor, &current), &actor)?;

        let previous_day = current.calendar_date();

        if let Some(title) = patch.title {
            current.title = validation::required_text("title", &title, self.config.max_title_length)?;
        }
        if let Some(location) = patch.location {
            current.location =
                validation::required_text("location", &location, self.config.max_location_length)?;
        }
        if let Some(description) = patch.description {
            current.description = validation::optional_text(
                "description",
                Some(&description),
                self.config.max_description_length,
            )?;
        }
        if let Some(date) = patch.date {
            current.date = date;
        }
        current.updated_at = self.clock.now();

        if current.calendar_date() == previous_day {
            self.repos.events.update(current.clone()).await?;
        } else {
            match self.repos.events.reschedule(current.clone()).await? {
                Reschedule::Applied => {
                    info!(from = %previous_day, to = %current.calendar_date(), "event rescheduled");
                }
                Reschedule::Blocked { committed } => {
                    return Err(DomainError::invalid_operation(format!(
                        "cannot move the event date while {committed} vendor booking(s) are confirmed or completed"
                    )));
                }
            }
        }

        self.events.publish(&BookingDomainEvent::EventUpdated {
            id,
            at: current.updated_at,
        });

        info!("Successfully updated event");
        Ok(current)
    }

    #[instrument(
        name = "event_bookings.planning.delete_event",
        skip(self),
        fields(event_id = %id, acting_user = %acting_user)
    )]
    pub async fn delete_event(&self, id: Uuid, acting_user: Uuid) -> Result<(), DomainError> {
        info!("Deleting event");

        let actor = resolve_actor(self.repos.directory.as_ref(), acting_user).await?;
        let event = self.get_event(id).await?;
        gate::ensure(gate::owns_event(&actor, &event), &actor)?;

        match self.repos.events.delete_cascade(id).await? {
            EventRemoval::Deleted { bookings, guests } => {
                self.events.publish(&BookingDomainEvent::EventDeleted {
                    id,
                    at: self.clock.now(),
                });
                info!(bookings, guests, "Successfully deleted event");
                Ok(())
            }
            EventRemoval::Blocked { active } => Err(DomainError::invalid_operation(format!(
                "event still has {active} booking(s) that are not cancelled"
            ))),
            EventRemoval::NotFound => {
                warn!("event vanished before delete");
                Err(DomainError::event_not_found(id))
            }
        }
    }
}
