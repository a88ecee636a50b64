//! End-to-end booking flows through the local client on a migrated SQLite database.

mod common;

use common::{at_noon, day, harness};
use event_bookings::contract::error::{ConflictKind, EventBookingsError};
use event_bookings::contract::model::{
    BookingFilter, BookingScope, BookingStatus, DateRange, NewBooking,
};
use uuid::Uuid;

#[tokio::test]
async fn booking_walks_through_its_lifecycle() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let dj = h.vendor("dj@example.com", "Night Beats").await;
    let event = h.event_on(&planner, at_noon(2025, 6, 14)).await;

    let booking = h.book(&planner, &event, &dj).await;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.event_date, day(2025, 6, 14));

    let confirmed = h.client.confirm_booking(booking.id, dj.user.id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert!(!h
        .client
        .is_vendor_available(dj.profile.id, day(2025, 6, 14))
        .await
        .unwrap());

    let completed = h.client.complete_booking(booking.id, planner.id).await.unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    let stored = h.client.get_booking(booking.id).await.unwrap();
    assert_eq!(stored.status, BookingStatus::Completed);
    // A completed booking still holds the day.
    assert!(!h
        .client
        .is_vendor_available(dj.profile.id, day(2025, 6, 14))
        .await
        .unwrap());

    assert_eq!(
        h.published.names(),
        vec![
            "event.created",
            "booking.created",
            "booking.status_changed",
            "booking.status_changed"
        ]
    );
}

#[tokio::test]
async fn same_vendor_cannot_be_booked_twice_for_one_event() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let florist = h.vendor("flo@example.com", "Petals").await;
    let event = h.event_on(&planner, at_noon(2025, 7, 1)).await;
    h.book(&planner, &event, &florist).await;

    let err = h
        .client
        .create_booking(
            NewBooking {
                event_id: event.id,
                vendor_id: florist.profile.id,
                service_id: florist.service.id,
                notes: Some("second try".into()),
            },
            planner.id,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EventBookingsError::Conflict(ConflictKind::AlreadyBooked));
}

#[tokio::test]
async fn committed_vendor_is_unavailable_for_other_events_that_day() {
    let h = harness().await;
    let ana = h.planner("ana@example.com").await;
    let ben = h.planner("ben@example.com").await;
    let band = h.vendor("band@example.com", "The Strings").await;

    let first = h.event_on(&ana, at_noon(2025, 8, 2)).await;
    let booking = h.book(&ana, &first, &band).await;
    h.client.confirm_booking(booking.id, band.user.id).await.unwrap();

    // Same calendar day, different hour.
    let second = h
        .event_on(&ben, at_noon(2025, 8, 2) + chrono::Duration::hours(6))
        .await;
    let err = h
        .client
        .create_booking(
            NewBooking {
                event_id: second.id,
                vendor_id: band.profile.id,
                service_id: band.service.id,
                notes: None,
            },
            ben.id,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EventBookingsError::Conflict(ConflictKind::VendorUnavailable));

    // A different day is fine.
    let third = h.event_on(&ben, at_noon(2025, 8, 3)).await;
    h.book(&ben, &third, &band).await;
}

#[tokio::test]
async fn only_one_of_two_pending_bookings_can_be_confirmed() {
    let h = harness().await;
    let ana = h.planner("ana@example.com").await;
    let ben = h.planner("ben@example.com").await;
    let chef = h.vendor("chef@example.com", "Fine Dining").await;

    let e1 = h.event_on(&ana, at_noon(2025, 9, 20)).await;
    let e2 = h.event_on(&ben, at_noon(2025, 9, 20)).await;
    let b1 = h.book(&ana, &e1, &chef).await;
    let b2 = h.book(&ben, &e2, &chef).await;

    h.client.confirm_booking(b1.id, chef.user.id).await.unwrap();
    let err = h.client.confirm_booking(b2.id, chef.user.id).await.unwrap_err();
    assert_eq!(err, EventBookingsError::Conflict(ConflictKind::VendorUnavailable));
    assert_eq!(
        h.client.get_booking(b2.id).await.unwrap().status,
        BookingStatus::Pending
    );

    // Cancelling the first releases the day.
    h.client.cancel_booking(b1.id, ana.id).await.unwrap();
    assert!(h
        .client
        .is_vendor_available(chef.profile.id, day(2025, 9, 20))
        .await
        .unwrap());
    let confirmed = h.client.confirm_booking(b2.id, ben.id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn transitions_outside_the_state_machine_are_rejected() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let baker = h.vendor("cake@example.com", "Sweet Tiers").await;
    let event = h.event_on(&planner, at_noon(2025, 10, 4)).await;
    let booking = h.book(&planner, &event, &baker).await;

    let err = h.client.complete_booking(booking.id, planner.id).await.unwrap_err();
    assert_eq!(
        err,
        EventBookingsError::InvalidStateTransition {
            from: BookingStatus::Pending,
            to: BookingStatus::Completed,
        }
    );

    h.client.cancel_booking(booking.id, baker.user.id).await.unwrap();
    for next in BookingStatus::ALL {
        let res = h
            .client
            .update_booking_status(booking.id, next, planner.id)
            .await;
        assert!(
            matches!(res, Err(EventBookingsError::InvalidStateTransition { .. })),
            "cancelled -> {next} must be rejected"
        );
    }
}

#[tokio::test]
async fn only_the_parties_can_touch_a_booking() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let stranger = h.planner("eve@example.com").await;
    let photo = h.vendor("photo@example.com", "Snapshots").await;
    let event = h.event_on(&planner, at_noon(2025, 5, 10)).await;
    let booking = h.book(&planner, &event, &photo).await;

    let err = h.client.confirm_booking(booking.id, stranger.id).await.unwrap_err();
    assert_eq!(err, EventBookingsError::Unauthorized { actor: stranger.id });

    let err = h
        .client
        .update_booking_notes(booking.id, Some("hi".into()), stranger.id)
        .await
        .unwrap_err();
    assert_eq!(err, EventBookingsError::Unauthorized { actor: stranger.id });

    // Unknown acting user.
    let ghost = Uuid::new_v4();
    let err = h.client.cancel_booking(booking.id, ghost).await.unwrap_err();
    assert_eq!(err, EventBookingsError::Unauthorized { actor: ghost });

    // The vendor may not book itself onto someone else's event.
    let other = h.vendor("video@example.com", "Reels").await;
    let err = h
        .client
        .create_booking(
            NewBooking {
                event_id: event.id,
                vendor_id: other.profile.id,
                service_id: other.service.id,
                notes: None,
            },
            other.user.id,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EventBookingsError::Unauthorized { actor: other.user.id });
}

#[tokio::test]
async fn booking_requires_existing_rows_and_a_matching_service() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let dj = h.vendor("dj@example.com", "Night Beats").await;
    let florist = h.vendor("flo@example.com", "Petals").await;
    let event = h.event_on(&planner, at_noon(2025, 6, 1)).await;

    let err = h
        .client
        .create_booking(
            NewBooking {
                event_id: event.id,
                vendor_id: dj.profile.id,
                service_id: florist.service.id,
                notes: None,
            },
            planner.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EventBookingsError::Validation { ref message } if message.starts_with("service_id")));

    let missing = Uuid::new_v4();
    let err = h
        .client
        .create_booking(
            NewBooking {
                event_id: missing,
                vendor_id: dj.profile.id,
                service_id: dj.service.id,
                notes: None,
            },
            planner.id,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EventBookingsError::not_found("Event", missing));

    let err = h
        .client
        .create_booking(
            NewBooking {
                event_id: event.id,
                vendor_id: missing,
                service_id: dj.service.id,
                notes: None,
            },
            planner.id,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EventBookingsError::not_found("Vendor", missing));
}

#[tokio::test]
async fn notes_are_validated_and_blank_clears_them() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let dj = h.vendor("dj@example.com", "Night Beats").await;
    let event = h.event_on(&planner, at_noon(2025, 6, 1)).await;
    let booking = h.book(&planner, &event, &dj).await;

    let updated = h
        .client
        .update_booking_notes(booking.id, Some("  bring the fog machine ".into()), dj.user.id)
        .await
        .unwrap();
    assert_eq!(updated.notes.as_deref(), Some("bring the fog machine"));

    let too_long = "x".repeat(1001);
    let err = h
        .client
        .update_booking_notes(booking.id, Some(too_long), planner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EventBookingsError::Validation { .. }));

    let cleared = h
        .client
        .update_booking_notes(booking.id, Some("   ".into()), planner.id)
        .await
        .unwrap();
    assert_eq!(cleared.notes, None);
    assert_eq!(h.client.get_booking(booking.id).await.unwrap().notes, None);
}

#[tokio::test]
async fn only_pending_or_cancelled_bookings_can_be_deleted_by_the_planner() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let dj = h.vendor("dj@example.com", "Night Beats").await;
    let florist = h.vendor("flo@example.com", "Petals").await;
    let event = h.event_on(&planner, at_noon(2025, 6, 1)).await;

    let confirmed = h.book(&planner, &event, &dj).await;
    h.client.confirm_booking(confirmed.id, dj.user.id).await.unwrap();
    let err = h.client.delete_booking(confirmed.id, planner.id).await.unwrap_err();
    assert!(matches!(err, EventBookingsError::InvalidOperation { .. }));

    let pending = h.book(&planner, &event, &florist).await;
    let err = h.client.delete_booking(pending.id, florist.user.id).await.unwrap_err();
    assert_eq!(err, EventBookingsError::Unauthorized { actor: florist.user.id });

    h.client.delete_booking(pending.id, planner.id).await.unwrap();
    let err = h.client.get_booking(pending.id).await.unwrap_err();
    assert_eq!(err, EventBookingsError::not_found("Booking", pending.id));
    assert!(h.published.names().contains(&"booking.deleted"));
}

#[tokio::test]
async fn listing_filters_orders_and_pages() {
    let h = harness().await;
    let ana = h.planner("ana@example.com").await;
    let ben = h.planner("ben@example.com").await;
    let dj = h.vendor("dj@example.com", "Night Beats").await;
    let florist = h.vendor("flo@example.com", "Petals").await;

    let late = h.event_on(&ana, at_noon(2025, 12, 31)).await;
    let early = h.event_on(&ana, at_noon(2025, 3, 1)).await;
    let bens = h.event_on(&ben, at_noon(2025, 6, 15)).await;

    let b_late = h.book(&ana, &late, &dj).await;
    let b_early = h.book(&ana, &early, &dj).await;
    let b_ben = h.book(&ben, &bens, &florist).await;
    h.client.confirm_booking(b_early.id, dj.user.id).await.unwrap();

    let all = h.client.list_bookings(BookingFilter::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![b_early.id, b_ben.id, b_late.id]);

    let by_vendor = h
        .client
        .list_bookings(BookingFilter {
            vendor_id: Some(dj.profile.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_vendor.len(), 2);

    let by_planner = h
        .client
        .list_bookings(BookingFilter {
            planner_id: Some(ben.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_planner.len(), 1);
    assert_eq!(by_planner[0].id, b_ben.id);

    let confirmed = h
        .client
        .list_bookings(BookingFilter {
            status: Some(BookingStatus::Confirmed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, b_early.id);

    let summer = h
        .client
        .list_bookings(BookingFilter {
            date_range: Some(DateRange::new(day(2025, 6, 1), day(2025, 6, 30))),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(summer.len(), 1);

    let page = h
        .client
        .list_bookings(BookingFilter {
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, b_ben.id);

    let err = h
        .client
        .list_bookings(BookingFilter {
            limit: Some(0),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EventBookingsError::Validation { .. }));

    let err = h
        .client
        .list_bookings(BookingFilter {
            date_range: Some(DateRange::new(day(2025, 6, 30), day(2025, 6, 1))),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EventBookingsError::Validation { .. }));
}

#[tokio::test]
async fn upcoming_lists_confirmed_bookings_from_today() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let dj = h.vendor("dj@example.com", "Night Beats").await;
    let florist = h.vendor("flo@example.com", "Petals").await;

    let past = h.event_on(&planner, at_noon(2025, 1, 10)).await;
    let soon = h.event_on(&planner, at_noon(2025, 2, 10)).await;
    let later = h.event_on(&planner, at_noon(2025, 4, 10)).await;

    let b_past = h.book(&planner, &past, &dj).await;
    let b_soon = h.book(&planner, &soon, &dj).await;
    let b_later = h.book(&planner, &later, &dj).await;
    let _pending = h.book(&planner, &soon, &florist).await;
    for b in [&b_past, &b_soon, &b_later] {
        h.client.confirm_booking(b.id, dj.user.id).await.unwrap();
    }

    let upcoming = h
        .client
        .upcoming_bookings(BookingScope::Vendor(dj.profile.id), day(2025, 2, 10))
        .await
        .unwrap();
    let ids: Vec<_> = upcoming.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![b_soon.id, b_later.id]);

    let upcoming = h
        .client
        .upcoming_bookings(BookingScope::Planner(planner.id), day(2025, 3, 1))
        .await
        .unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, b_later.id);
}

#[tokio::test]
async fn availability_queries() {
    let h = harness().await;
    let planner = h.planner("ana@example.com").await;
    let dj = h.vendor("dj@example.com", "Night Beats").await;

    for d in [3, 9, 20] {
        let event = h.event_on(&planner, at_noon(2025, 6, d)).await;
        let booking = h.book(&planner, &event, &dj).await;
        if d != 9 {
            h.client.confirm_booking(booking.id, dj.user.id).await.unwrap();
        }
    }

    let taken = h
        .client
        .unavailable_dates(dj.profile.id, DateRange::new(day(2025, 6, 1), day(2025, 6, 30)))
        .await
        .unwrap();
    assert_eq!(
        taken.into_iter().collect::<Vec<_>>(),
        vec![day(2025, 6, 3), day(2025, 6, 20)]
    );

    // Range bounds are inclusive.
    let taken = h
        .client
        .unavailable_dates(dj.profile.id, DateRange::single(day(2025, 6, 20)))
        .await
        .unwrap();
    assert_eq!(taken.len(), 1);

    assert!(h.client.is_vendor_available(dj.profile.id, day(2025, 6, 9)).await.unwrap());

    let missing = Uuid::new_v4();
    let err = h
        .client
        .is_vendor_available(missing, day(2025, 6, 9))
        .await
        .unwrap_err();
    assert_eq!(err, EventBookingsError::not_found("Vendor", missing));

    let err = h
        .client
        .unavailable_dates(dj.profile.id, DateRange::new(day(2025, 1, 1), day(2026, 12, 31)))
        .await
        .unwrap_err();
    assert!(matches!(err, EventBookingsError::Validation { .. }));
}

#[tokio::test]
async fn booking_statistics_by_scope() {
    let h = harness().await;
    let ana = h.planner("ana@example.com").await;
    let ben = h.planner("ben@example.com").await;
    let dj = h.vendor("dj@example.com", "Night Beats").await;
    let florist = h.vendor("flo@example.com", "Petals").await;

    let e1 = h.event_on(&ana, at_noon(2025, 6, 1)).await;
    let e2 = h.event_on(&ana, at_noon(2025, 6, 2)).await;
    let e3 = h.event_on(&ben, at_noon(2025, 6, 3)).await;

    let b1 = h.book(&ana, &e1, &dj).await;
    let b2 = h.book(&ana, &e2, &dj).await;
    let _b3 = h.book(&ana, &e1, &florist).await;
    let b4 = h.book(&ben, &e3, &dj).await;
    h.client.confirm_booking(b1.id, dj.user.id).await.unwrap();
    h.client.complete_booking(b1.id, dj.user.id).await.unwrap();
    h.client.cancel_booking(b2.id, ana.id).await.unwrap();
    h.client.confirm_booking(b4.id, ben.id).await.unwrap();

    let vendor = h
        .client
        .booking_statistics(BookingScope::Vendor(dj.profile.id))
        .await
        .unwrap();
    assert_eq!(vendor.total, 3);
    assert_eq!(vendor.completed, 1);
    assert_eq!(vendor.cancelled, 1);
    assert_eq!(vendor.confirmed, 1);
    assert_eq!(vendor.pending, 0);

    let planner = h
        .client
        .booking_statistics(BookingScope::Planner(ana.id))
        .await
        .unwrap();
    assert_eq!(planner.total, 3);
    assert_eq!(planner.pending, 1);
    assert_eq!(
        planner.pending + planner.confirmed + planner.completed + planner.cancelled,
        planner.total
    );

    let missing = Uuid::new_v4();
    let err = h
        .client
        .booking_statistics(BookingScope::Vendor(missing))
        .await
        .unwrap_err();
    assert_eq!(err, EventBookingsError::not_found("Vendor", missing));
}
