use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::BookingStatus;

/// Which uniqueness rule a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    AlreadyBooked,
    VendorUnavailable,
    DuplicateGuest,
    /// Another writer changed the row between read and write.
    ConcurrentUpdate,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConflictKind::AlreadyBooked => "vendor is already booked for this event",
            ConflictKind::VendorUnavailable => "vendor is not available on the event date",
            ConflictKind::DuplicateGuest => "a guest with this email is already invited",
            ConflictKind::ConcurrentUpdate => "the record was modified concurrently",
        };
        f.write_str(s)
    }
}

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventBookingsError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: Uuid },

    #[error("User {actor} is not allowed to perform this operation")]
    Unauthorized { actor: Uuid },

    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStateTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Service temporarily unavailable")]
    Unavailable,

    #[error("Internal error")]
    Internal,
}

impl EventBookingsError {
    pub fn not_found(entity: impl Into<String>, id: Uuid) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }

    pub fn conflict(kind: ConflictKind) -> Self {
        Self::Conflict(kind)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for EventBookingsError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            NotFound { entity, id } => Self::not_found(entity, id),
            Unauthorized { actor } => Self::Unauthorized { actor },
            AlreadyBooked { .. } => Self::conflict(ConflictKind::AlreadyBooked),
            VendorUnavailable { .. } => Self::conflict(ConflictKind::VendorUnavailable),
            DuplicateGuest { .. } => Self::conflict(ConflictKind::DuplicateGuest),
            ConcurrentUpdate { .. } => Self::conflict(ConflictKind::ConcurrentUpdate),
            InvalidStateTransition { from, to } => Self::InvalidStateTransition { from, to },
            InvalidOperation { message } => Self::invalid_operation(message),
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            Unavailable { .. } => Self::Unavailable,
            Database { .. } => Self::internal(),
        }
    }
}
