use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::BookingStatus;
use crate::domain::repo::RepoError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("User {actor} is not allowed to perform this operation")]
    Unauthorized { actor: Uuid },

    #[error("Vendor {vendor_id} is already booked for event {event_id}")]
    AlreadyBooked { event_id: Uuid, vendor_id: Uuid },

    #[error("Vendor {vendor_id} is not available on {date}")]
    VendorUnavailable { vendor_id: Uuid, date: NaiveDate },

    #[error("Guest with email '{email}' already invited to event {event_id}")]
    DuplicateGuest { event_id: Uuid, email: String },

    #[error("{entity} {id} was modified concurrently")]
    ConcurrentUpdate { entity: &'static str, id: Uuid },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStateTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn event_not_found(id: Uuid) -> Self {
        Self::not_found("Event", id)
    }

    pub fn vendor_not_found(id: Uuid) -> Self {
        Self::not_found("Vendor", id)
    }

    pub fn service_not_found(id: Uuid) -> Self {
        Self::not_found("Service", id)
    }

    pub fn booking_not_found(id: Uuid) -> Self {
        Self::not_found("Booking", id)
    }

    pub fn guest_not_found(id: Uuid) -> Self {
        Self::not_found("Guest", id)
    }

    pub fn unauthorized(actor: Uuid) -> Self {
        Self::Unauthorized { actor }
    }

    pub fn already_booked(event_id: Uuid, vendor_id: Uuid) -> Self {
        Self::AlreadyBooked {
            event_id,
            vendor_id,
        }
    }

    pub fn vendor_unavailable(vendor_id: Uuid, date: NaiveDate) -> Self {
        Self::VendorUnavailable { vendor_id, date }
    }

    pub fn duplicate_guest(event_id: Uuid, email: impl Into<String>) -> Self {
        Self::DuplicateGuest {
            event_id,
            email: email.into(),
        }
    }

    pub fn concurrent_update(entity: &'static str, id: Uuid) -> Self {
        Self::ConcurrentUpdate { entity, id }
    }

    pub fn invalid_transition(from: BookingStatus, to: BookingStatus) -> Self {
        Self::InvalidStateTransition { from, to }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

/// Storage failures the caller did not handle explicitly.
impl From<RepoError> for DomainError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Unavailable(message) => Self::unavailable(message),
            RepoError::Constraint(c) => Self::database(format!("unexpected constraint violation: {c}")),
            RepoError::Other(e) => Self::database(format!("{e:#}")),
        }
    }
}
