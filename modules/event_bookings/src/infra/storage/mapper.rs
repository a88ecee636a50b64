//! Row <-> contract model conversions.

use anyhow::anyhow;
use sea_orm::Set;

use crate::contract::model::{
    Booking, BookingStatus, Event, Guest, RsvpStatus, ServiceOffering, UserAccount, VendorProfile,
};
use crate::infra::storage::entity::{events, guests, services, users, vendor_bookings, vendor_profiles};

pub fn user_to_contract(m: users::Model) -> UserAccount {
    UserAccount {
        id: m.id,
        email: m.email,
        display_name: m.display_name,
        is_planner: m.is_planner,
        is_vendor: m.is_vendor,
    }
}

pub fn vendor_to_contract(m: vendor_profiles::Model) -> VendorProfile {
    VendorProfile {
        id: m.id,
        user_id: m.user_id,
        business_name: m.business_name,
        verified: m.verified,
    }
}

pub fn service_to_contract(m: services::Model) -> ServiceOffering {
    ServiceOffering {
        id: m.id,
        vendor_id: m.vendor_id,
        category_id: m.category_id,
        name: m.name,
        price: m.price,
    }
}

pub fn event_to_contract(m: events::Model) -> Event {
    Event {
        id: m.id,
        planner_id: m.planner_id,
        title: m.title,
        description: m.description,
        date: m.date,
        location: m.location,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

pub fn event_to_active(e: &Event) -> events::ActiveModel {
    events::ActiveModel {
        id: Set(e.id),
        planner_id: Set(e.planner_id),
        title: Set(e.title.clone()),
        description: Set(e.description.clone()),
        date: Set(e.date),
        location: Set(e.location.clone()),
        created_at: Set(e.created_at),
        updated_at: Set(e.updated_at),
    }
}

pub fn booking_to_contract(m: vendor_bookings::Model) -> anyhow::Result<Booking> {
    let status = m
        .status
        .parse::<BookingStatus>()
        .map_err(|e| anyhow!("booking {}: {e}", m.id))?;
    Ok(Booking {
        id: m.id,
        event_id: m.event_id,
        vendor_id: m.vendor_id,
        service_id: m.service_id,
        status,
        notes: m.notes,
        event_date: m.event_date,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn booking_to_active(b: &Booking) -> vendor_bookings::ActiveModel {
    vendor_bookings::ActiveModel {
        id: Set(b.id),
        event_id: Set(b.event_id),
        vendor_id: Set(b.vendor_id),
        service_id: Set(b.service_id),
        status: Set(b.status.as_str().to_string()),
        notes: Set(b.notes.clone()),
        event_date: Set(b.event_date),
        committed_on: Set(b.status.is_committed().then_some(b.event_date)),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    }
}

pub fn guest_to_contract(m: guests::Model) -> anyhow::Result<Guest> {
    let rsvp_status = m
        .rsvp_status
        .parse::<RsvpStatus>()
        .map_err(|e| anyhow!("guest {}: {e}", m.id))?;
    Ok(Guest {
        id: m.id,
        event_id: m.event_id,
        user_id: m.user_id,
        name: m.name,
        email: m.email,
        phone: m.phone,
        rsvp_status,
        dietary_restrictions: m.dietary_restrictions,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn guest_to_active(g: &Guest) -> guests::ActiveModel {
    guests::ActiveModel {
        id: Set(g.id),
        event_id: Set(g.event_id),
        user_id: Set(g.user_id),
        name: Set(g.name.clone()),
        email: Set(g.email.clone()),
        phone: Set(g.phone.clone()),
        rsvp_status: Set(g.rsvp_status.as_str().to_string()),
        dietary_restrictions: Set(g.dietary_restrictions.clone()),
        created_at: Set(g.created_at),
        updated_at: Set(g.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn row(status: &str) -> vendor_bookings::Model {
        let now = Utc::now();
        vendor_bookings::Model {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            status: status.into(),
            notes: None,
            event_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            committed_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn committed_on_follows_status() {
        let mut booking = booking_to_contract(row("PENDING")).unwrap();
        let am = booking_to_active(&booking);
        assert_eq!(am.committed_on, Set(None));

        booking.status = BookingStatus::Confirmed;
        let am = booking_to_active(&booking);
        assert_eq!(am.committed_on, Set(Some(booking.event_date)));
    }

    #[test]
    fn unknown_status_is_an_error() {
        assert!(booking_to_contract(row("ON_HOLD")).is_err());
    }
}
