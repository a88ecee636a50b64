use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::{
    Booking, BookingFilter, BookingScope, BookingStats, BookingStatus, DateRange, Event, Guest,
    GuestStats, RsvpStatus, ServiceOffering, UserAccount, VendorProfile,
};

/// Uniqueness rules enforced by the store itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// One booking per (event, vendor).
    BookingEventVendor,
    /// One committed booking per (vendor, calendar date).
    VendorCommittedDate,
    /// One guest per (event, email).
    GuestEventEmail,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Constraint::BookingEventVendor => "booking(event, vendor)",
            Constraint::VendorCommittedDate => "booking(vendor, committed date)",
            Constraint::GuestEventEmail => "guest(event, email)",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("constraint violated: {0}")]
    Constraint(Constraint),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome of an event date change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reschedule {
    Applied,
    /// Committed bookings hold the old date.
    Blocked { committed: u64 },
}

/// Outcome of an event deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRemoval {
    Deleted { bookings: u64, guests: u64 },
    /// Bookings that are not cancelled still reference the event.
    Blocked { active: u64 },
    NotFound,
}

/// Read-only view of users, vendor profiles and their services.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> RepoResult<Option<UserAccount>>;
    /// Case-insensitive lookup.
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>>;
    async fn find_vendor(&self, id: Uuid) -> RepoResult<Option<VendorProfile>>;
    async fn find_service(&self, id: Uuid) -> RepoResult<Option<ServiceOffering>>;
}

#[async_trait]
pub trait EventsRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> RepoResult<Option<Event>>;
    async fn insert(&self, event: Event) -> RepoResult<()>;
    /// Update everything but the date (by primary key in `event.id`).
    async fn update(&self, event: Event) -> RepoResult<()>;
    /// Update the event including a new calendar date and move its bookings
    /// along, atomically. Refused while any booking is committed.
    async fn reschedule(&self, event: Event) -> RepoResult<Reschedule>;
    /// Delete the event with its cancelled bookings and all guests, atomically.
    async fn delete_cascade(&self, id: Uuid) -> RepoResult<EventRemoval>;
}

/// Port for the booking table. Service computes ids/timestamps/validation; repo persists.
#[async_trait]
pub trait BookingsRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> RepoResult<Option<Booking>>;
    async fn exists_for_event_vendor(&self, event_id: Uuid, vendor_id: Uuid) -> RepoResult<bool>;
    /// True if the vendor holds a committed booking on `date`.
    async fn is_vendor_committed_on(&self, vendor_id: Uuid, date: NaiveDate) -> RepoResult<bool>;
    async fn committed_dates(
        &self,
        vendor_id: Uuid,
        range: DateRange,
    ) -> RepoResult<BTreeSet<NaiveDate>>;
    /// Fails with `Constraint::BookingEventVendor` or `Constraint::VendorCommittedDate`.
    async fn insert(&self, booking: Booking) -> RepoResult<()>;
    /// Compare-and-set status write. Returns false if the row is gone or no
    /// longer in `expected`. Committing fails with `Constraint::VendorCommittedDate`
    /// when another booking of the vendor already holds the date.
    async fn transition(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        at: DateTime<Utc>,
    ) -> RepoResult<bool>;
    async fn update_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> RepoResult<bool>;
    /// Delete only while the status is one of `allowed`. Returns true if a row was deleted.
    async fn delete_if_status(&self, id: Uuid, allowed: &[BookingStatus]) -> RepoResult<bool>;
    /// Ordered by event date, then creation time. `limit`/`offset` are applied as given.
    async fn list(&self, filter: &BookingFilter) -> RepoResult<Vec<Booking>>;
    async fn upcoming(&self, scope: BookingScope, from: NaiveDate) -> RepoResult<Vec<Booking>>;
    async fn count_by_status(&self, scope: BookingScope) -> RepoResult<BookingStats>;
}

/// Validated column writes for one guest. `None` leaves a column as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub user_id: Option<Option<Uuid>>,
    pub phone: Option<Option<String>>,
    pub dietary_restrictions: Option<Option<String>>,
    pub rsvp_status: Option<RsvpStatus>,
    pub updated_at: DateTime<Utc>,
}

impl GuestChanges {
    pub fn at(updated_at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            email: None,
            user_id: None,
            phone: None,
            dietary_restrictions: None,
            rsvp_status: None,
            updated_at,
        }
    }

    /// Apply onto an in-memory copy.
    pub fn apply(&self, guest: &mut Guest) {
        if let Some(name) = &self.name {
            guest.name = name.clone();
        }
        if let Some(email) = &self.email {
            guest.email = email.clone();
        }
        if let Some(user_id) = self.user_id {
            guest.user_id = user_id;
        }
        if let Some(phone) = &self.phone {
            guest.phone = phone.clone();
        }
        if let Some(dietary) = &self.dietary_restrictions {
            guest.dietary_restrictions = dietary.clone();
        }
        if let Some(status) = self.rsvp_status {
            guest.rsvp_status = status;
        }
        guest.updated_at = self.updated_at;
    }
}

#[async_trait]
pub trait GuestsRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> RepoResult<Option<Guest>>;
    /// `email` is expected normalized (trimmed, lowercase).
    async fn email_taken(&self, event_id: Uuid, email: &str) -> RepoResult<bool>;
    /// Fails with `Constraint::GuestEventEmail`.
    async fn insert(&self, guest: Guest) -> RepoResult<()>;
    /// Writes only the columns set in `changes`. Returns false if the guest is gone.
    /// Fails with `Constraint::GuestEventEmail`.
    async fn update(&self, id: Uuid, changes: &GuestChanges) -> RepoResult<bool>;
    async fn set_rsvp(&self, id: Uuid, status: RsvpStatus, at: DateTime<Utc>) -> RepoResult<bool>;
    async fn delete(&self, id: Uuid) -> RepoResult<bool>;
    async fn list_by_event(
        &self,
        event_id: Uuid,
        status: Option<RsvpStatus>,
    ) -> RepoResult<Vec<Guest>>;
    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Guest>>;
    async fn count_by_status(&self, event_id: Uuid) -> RepoResult<GuestStats>;
}

/// The storage ports the domain components are wired with.
#[derive(Clone)]
pub struct Repositories {
    pub directory: Arc<dyn Directory>,
    pub events: Arc<dyn EventsRepository>,
    pub bookings: Arc<dyn BookingsRepository>,
    pub guests: Arc<dyn GuestsRepository>,
}
