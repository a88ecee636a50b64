//! Ownership rules. Pure functions of the actor and the loaded rows.

use crate::contract::model::{Actor, Event, Guest, Role, VendorProfile};
use crate::domain::error::DomainError;

pub fn owns_event(actor: &Actor, event: &Event) -> bool {
    event.planner_id == actor.user_id
}

pub fn owns_vendor_profile(actor: &Actor, vendor: &VendorProfile) -> bool {
    vendor.user_id == actor.user_id
}

/// Planner of the booked event or the user behind the booked vendor.
pub fn can_act_on_booking(actor: &Actor, event: &Event, vendor: &VendorProfile) -> bool {
    owns_event(actor, event) || owns_vendor_profile(actor, vendor)
}

pub fn can_create_event(actor: &Actor) -> bool {
    actor.has_role(Role::Planner) || actor.has_role(Role::Vendor)
}

/// The event's planner or the registered user the guest record is linked to.
pub fn can_respond_to_invitation(actor: &Actor, event: &Event, guest: &Guest) -> bool {
    owns_event(actor, event) || guest.user_id == Some(actor.user_id)
}

pub fn ensure(allowed: bool, actor: &Actor) -> Result<(), DomainError> {
    if allowed {
        Ok(())
    } else {
        Err(DomainError::unauthorized(actor.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::RsvpStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(planner_id: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            planner_id,
            title: "Wedding".into(),
            description: None,
            date: now,
            location: "Hall".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn vendor(user_id: Uuid) -> VendorProfile {
        VendorProfile {
            id: Uuid::new_v4(),
            user_id,
            business_name: "Flowers Inc".into(),
            verified: true,
        }
    }

    fn guest(event_id: Uuid, user_id: Option<Uuid>) -> Guest {
        let now = Utc::now();
        Guest {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            name: "Ann".into(),
            email: "ann@example.com".into(),
            phone: None,
            rsvp_status: RsvpStatus::Invited,
            dietary_restrictions: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn planner_and_vendor_may_act_on_booking() {
        let planner = Actor::new(Uuid::new_v4(), [Role::Planner]);
        let vendor_user = Actor::new(Uuid::new_v4(), [Role::Vendor]);
        let stranger = Actor::new(Uuid::new_v4(), [Role::Planner, Role::Vendor]);
        let e = event(planner.user_id);
        let v = vendor(vendor_user.user_id);

        assert!(can_act_on_booking(&planner, &e, &v));
        assert!(can_act_on_booking(&vendor_user, &e, &v));
        assert!(!can_act_on_booking(&stranger, &e, &v));
    }

    #[test]
    fn event_creation_needs_a_role() {
        assert!(can_create_event(&Actor::new(Uuid::new_v4(), [Role::Planner])));
        assert!(can_create_event(&Actor::new(Uuid::new_v4(), [Role::Vendor])));
        assert!(!can_create_event(&Actor::new(Uuid::new_v4(), [])));
    }

    #[test]
    fn invitation_response_is_limited_to_guest_and_planner() {
        let planner = Actor::new(Uuid::new_v4(), [Role::Planner]);
        let invited = Actor::new(Uuid::new_v4(), []);
        let other = Actor::new(Uuid::new_v4(), []);
        let e = event(planner.user_id);
        let g = guest(e.id, Some(invited.user_id));

        assert!(can_respond_to_invitation(&planner, &e, &g));
        assert!(can_respond_to_invitation(&invited, &e, &g));
        assert!(!can_respond_to_invitation(&other, &e, &g));
        assert!(!can_respond_to_invitation(&other, &e, &guest(e.id, None)));
    }

    #[test]
    fn ensure_reports_the_actor() {
        let actor = Actor::new(Uuid::new_v4(), []);
        match ensure(false, &actor) {
            Err(DomainError::Unauthorized { actor: id }) => assert_eq!(id, actor.user_id),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
        assert!(ensure(true, &actor).is_ok());
    }
}
