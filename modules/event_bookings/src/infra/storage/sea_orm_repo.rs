//! SeaORM-backed implementations of the domain ports.
//!
//! Each repository is generic over `C: ConnectionTrait`, so it can be built
//! with a `DatabaseConnection` or a transactional connection. The events
//! repository also needs `TransactionTrait`: rescheduling and cascading
//! deletes touch several tables in one transaction.

use std::collections::BTreeSet;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::{
    Booking, BookingFilter, BookingScope, BookingStats, BookingStatus, DateRange, Event, Guest,
    GuestStats, RsvpStatus, ServiceOffering, UserAccount, VendorProfile,
};
use crate::domain::repo::{
    BookingsRepository, Constraint, Directory, EventRemoval, EventsRepository, GuestChanges,
    GuestsRepository, RepoError, RepoResult, Reschedule,
};
use crate::infra::storage::entity::{
    events, guests, services, users, vendor_bookings as bookings, vendor_profiles,
};
use crate::infra::storage::mapper;
use crate::infra::storage::migrations::index;

/// Map a unique-violation message to the constraint it names.
///
/// Postgres reports the index name; SQLite reports `table.column` pairs.
pub fn classify_unique(message: &str) -> Option<Constraint> {
    let m = message.to_ascii_lowercase();
    if m.contains(index::BOOKING_VENDOR_COMMITTED) || m.contains("vendor_bookings.committed_on") {
        Some(Constraint::VendorCommittedDate)
    } else if m.contains(index::BOOKING_EVENT_VENDOR) || m.contains("vendor_bookings.event_id") {
        Some(Constraint::BookingEventVendor)
    } else if m.contains(index::GUEST_EVENT_EMAIL) || m.contains("guests.event_id") {
        Some(Constraint::GuestEventEmail)
    } else {
        None
    }
}

fn map_err(context: &'static str) -> impl FnOnce(DbErr) -> RepoError {
    move |err| {
        if let Some(constraint) =
            db::errors::unique_violation_message(&err).and_then(|msg| classify_unique(&msg))
        {
            return RepoError::Constraint(constraint);
        }
        if db::errors::is_connectivity_error(&err) {
            return RepoError::Unavailable(format!("{context}: {err}"));
        }
        RepoError::Other(anyhow::Error::new(err).context(context))
    }
}

fn bookings_of(rows: Vec<bookings::Model>) -> RepoResult<Vec<Booking>> {
    rows.into_iter()
        .map(|m| mapper::booking_to_contract(m).map_err(RepoError::from))
        .collect()
}

fn guests_of(rows: Vec<guests::Model>) -> RepoResult<Vec<Guest>> {
    rows.into_iter()
        .map(|m| mapper::guest_to_contract(m).map_err(RepoError::from))
        .collect()
}

// ---------- directory ----------

/// Users, vendor profiles and services. Owned by other parts of the platform;
/// the `insert_*` helpers exist for provisioning and tests.
pub struct SeaOrmDirectory<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmDirectory<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub async fn insert_user(&self, user: &UserAccount) -> RepoResult<()> {
        let m = users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.trim().to_lowercase()),
            display_name: Set(user.display_name.clone()),
            is_planner: Set(user.is_planner),
            is_vendor: Set(user.is_vendor),
            created_at: Set(Utc::now()),
        };
        m.insert(&self.conn).await.map_err(map_err("insert user failed"))?;
        Ok(())
    }

    pub async fn insert_vendor(&self, vendor: &VendorProfile) -> RepoResult<()> {
        let m = vendor_profiles::ActiveModel {
            id: Set(vendor.id),
            user_id: Set(vendor.user_id),
            business_name: Set(vendor.business_name.clone()),
            verified: Set(vendor.verified),
            created_at: Set(Utc::now()),
        };
        m.insert(&self.conn).await.map_err(map_err("insert vendor failed"))?;
        Ok(())
    }

    pub async fn insert_service(&self, service: &ServiceOffering) -> RepoResult<()> {
        let m = services::ActiveModel {
            id: Set(service.id),
            vendor_id: Set(service.vendor_id),
            category_id: Set(service.category_id),
            name: Set(service.name.clone()),
            price: Set(service.price),
            created_at: Set(Utc::now()),
        };
        m.insert(&self.conn).await.map_err(map_err("insert service failed"))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C> Directory for SeaOrmDirectory<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_user(&self, id: Uuid) -> RepoResult<Option<UserAccount>> {
        let found = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_err("find_user failed"))?;
        Ok(found.map(mapper::user_to_contract))
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>> {
        let found = users::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(users::Column::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .one(&self.conn)
            .await
            .map_err(map_err("find_user_by_email failed"))?;
        Ok(found.map(mapper::user_to_contract))
    }

    async fn find_vendor(&self, id: Uuid) -> RepoResult<Option<VendorProfile>> {
        let found = vendor_profiles::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_err("find_vendor failed"))?;
        Ok(found.map(mapper::vendor_to_contract))
    }

    async fn find_service(&self, id: Uuid) -> RepoResult<Option<ServiceOffering>> {
        let found = services::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_err("find_service failed"))?;
        Ok(found.map(mapper::service_to_contract))
    }
}

// ---------- events ----------

pub struct SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> EventsRepository for SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find(&self, id: Uuid) -> RepoResult<Option<Event>> {
        let found = events::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_err("find event failed"))?;
        Ok(found.map(mapper::event_to_contract))
    }

    async fn insert(&self, event: Event) -> RepoResult<()> {
        mapper::event_to_active(&event)
            .insert(&self.conn)
            .await
            .map_err(map_err("insert event failed"))?;
        Ok(())
    }

    async fn update(&self, event: Event) -> RepoResult<()> {
        mapper::event_to_active(&event)
            .update(&self.conn)
            .await
            .map_err(map_err("update event failed"))?;
        Ok(())
    }

    async fn reschedule(&self, event: Event) -> RepoResult<Reschedule> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(map_err("begin reschedule failed"))?;

        // Row locks hold off confirmations (and, via the FK key-share lock, new
        // bookings) until the dates have moved. SQLite serializes writers instead.
        events::Entity::find_by_id(event.id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_err("lock event failed"))?;
        let rows = bookings::Entity::find()
            .filter(bookings::Column::EventId.eq(event.id))
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(map_err("lock event bookings failed"))?;
        let committed = rows.iter().filter(|b| b.committed_on.is_some()).count() as u64;
        if committed > 0 {
            return Ok(Reschedule::Blocked { committed });
        }

        mapper::event_to_active(&event)
            .update(&txn)
            .await
            .map_err(map_err("update event failed"))?;
        bookings::Entity::update_many()
            .col_expr(bookings::Column::EventDate, Expr::value(event.calendar_date()))
            .filter(bookings::Column::EventId.eq(event.id))
            .filter(bookings::Column::CommittedOn.is_null())
            .exec(&txn)
            .await
            .map_err(map_err("move booking dates failed"))?;

        txn.commit()
            .await
            .map_err(map_err("commit reschedule failed"))?;
        Ok(Reschedule::Applied)
    }

    async fn delete_cascade(&self, id: Uuid) -> RepoResult<EventRemoval> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(map_err("begin event delete failed"))?;

        let active = bookings::Entity::find()
            .filter(bookings::Column::EventId.eq(id))
            .filter(bookings::Column::Status.ne(BookingStatus::Cancelled.as_str()))
            .count(&txn)
            .await
            .map_err(map_err("count active bookings failed"))?;
        if active > 0 {
            return Ok(EventRemoval::Blocked { active });
        }

        // Only cancelled rows go; a booking created meanwhile makes the event delete fail on its FK.
        let removed_bookings = bookings::Entity::delete_many()
            .filter(bookings::Column::EventId.eq(id))
            .filter(bookings::Column::Status.eq(BookingStatus::Cancelled.as_str()))
            .exec(&txn)
            .await
            .map_err(map_err("delete cancelled bookings failed"))?
            .rows_affected;
        let removed_guests = guests::Entity::delete_many()
            .filter(guests::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_err("delete guests failed"))?
            .rows_affected;
        let removed = events::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_err("delete event failed"))?
            .rows_affected;
        if removed == 0 {
            return Ok(EventRemoval::NotFound);
        }

        txn.commit()
            .await
            .map_err(map_err("commit event delete failed"))?;
        Ok(EventRemoval::Deleted {
            bookings: removed_bookings,
            guests: removed_guests,
        })
    }
}

// ---------- bookings ----------

pub struct SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn planner_events(planner_id: Uuid) -> sea_orm::sea_query::SelectStatement {
    Query::select()
        .column(events::Column::Id)
        .from(events::Entity)
        .and_where(events::Column::PlannerId.eq(planner_id))
        .to_owned()
}

fn scoped(select: Select<bookings::Entity>, scope: BookingScope) -> Select<bookings::Entity> {
    match scope {
        BookingScope::Vendor(id) => select.filter(bookings::Column::VendorId.eq(id)),
        BookingScope::Planner(id) => {
            select.filter(bookings::Column::EventId.in_subquery(planner_events(id)))
        }
    }
}

#[async_trait::async_trait]
impl<C> BookingsRepository for SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find(&self, id: Uuid) -> RepoResult<Option<Booking>> {
        let found = bookings::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_err("find booking failed"))?;
        found
            .map(mapper::booking_to_contract)
            .transpose()
            .map_err(RepoError::from)
    }

    async fn exists_for_event_vendor(&self, event_id: Uuid, vendor_id: Uuid) -> RepoResult<bool> {
        let count = bookings::Entity::find()
            .filter(bookings::Column::EventId.eq(event_id))
            .filter(bookings::Column::VendorId.eq(vendor_id))
            .count(&self.conn)
            .await
            .map_err(map_err("exists_for_event_vendor failed"))?;
        Ok(count > 0)
    }

    async fn is_vendor_committed_on(&self, vendor_id: Uuid, date: NaiveDate) -> RepoResult<bool> {
        let count = bookings::Entity::find()
            .filter(bookings::Column::VendorId.eq(vendor_id))
            .filter(bookings::Column::CommittedOn.eq(date))
            .count(&self.conn)
            .await
            .map_err(map_err("is_vendor_committed_on failed"))?;
        Ok(count > 0)
    }

    async fn committed_dates(
        &self,
        vendor_id: Uuid,
        range: DateRange,
    ) -> RepoResult<BTreeSet<NaiveDate>> {
        let dates: Vec<Option<NaiveDate>> = bookings::Entity::find()
            .select_only()
            .column(bookings::Column::CommittedOn)
            .filter(bookings::Column::VendorId.eq(vendor_id))
            .filter(bookings::Column::CommittedOn.between(range.from, range.to))
            .into_tuple()
            .all(&self.conn)
            .await
            .map_err(map_err("committed_dates failed"))?;
        Ok(dates.into_iter().flatten().collect())
    }

    async fn insert(&self, booking: Booking) -> RepoResult<()> {
        mapper::booking_to_active(&booking)
            .insert(&self.conn)
            .await
            .map_err(map_err("insert booking failed"))?;
        Ok(())
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let update = bookings::Entity::update_many()
            .col_expr(bookings::Column::Status, Expr::value(next.as_str()))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(at));
        // The committed date is copied from the row itself, so it always matches event_date.
        let update = if next.is_committed() {
            update.col_expr(
                bookings::Column::CommittedOn,
                Expr::col(bookings::Column::EventDate).into(),
            )
        } else {
            update.col_expr(
                bookings::Column::CommittedOn,
                Expr::value(Option::<NaiveDate>::None),
            )
        };

        let res = update
            .filter(bookings::Column::Id.eq(id))
            .filter(bookings::Column::Status.eq(expected.as_str()))
            .exec(&self.conn)
            .await
            .map_err(map_err("booking transition failed"))?;
        Ok(res.rows_affected == 1)
    }

    async fn update_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let res = bookings::Entity::update_many()
            .col_expr(bookings::Column::Notes, Expr::value(notes))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(at))
            .filter(bookings::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .map_err(map_err("update booking notes failed"))?;
        Ok(res.rows_affected == 1)
    }

    async fn delete_if_status(&self, id: Uuid, allowed: &[BookingStatus]) -> RepoResult<bool> {
        let res = bookings::Entity::delete_many()
            .filter(bookings::Column::Id.eq(id))
            .filter(bookings::Column::Status.is_in(allowed.iter().map(|s| s.as_str())))
            .exec(&self.conn)
            .await
            .map_err(map_err("delete booking failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn list(&self, filter: &BookingFilter) -> RepoResult<Vec<Booking>> {
        let mut select = bookings::Entity::find();
        if let Some(event_id) = filter.event_id {
            select = select.filter(bookings::Column::EventId.eq(event_id));
        }
        if let Some(vendor_id) = filter.vendor_id {
            select = select.filter(bookings::Column::VendorId.eq(vendor_id));
        }
        if let Some(planner_id) = filter.planner_id {
            select = scoped(select, BookingScope::Planner(planner_id));
        }
        if let Some(status) = filter.status {
            select = select.filter(bookings::Column::Status.eq(status.as_str()));
        }
        if let Some(range) = filter.date_range {
            select = select.filter(bookings::Column::EventDate.between(range.from, range.to));
        }

        let rows = select
            .order_by_asc(bookings::Column::EventDate)
            .order_by_asc(bookings::Column::CreatedAt)
            .order_by_asc(bookings::Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.conn)
            .await
            .map_err(map_err("list bookings failed"))?;
        bookings_of(rows)
    }

    async fn upcoming(&self, scope: BookingScope, from: NaiveDate) -> RepoResult<Vec<Booking>> {
        let rows = scoped(bookings::Entity::find(), scope)
            .filter(bookings::Column::Status.eq(BookingStatus::Confirmed.as_str()))
            .filter(bookings::Column::EventDate.gte(from))
            .order_by_asc(bookings::Column::EventDate)
            .order_by_asc(bookings::Column::CreatedAt)
            .all(&self.conn)
            .await
            .map_err(map_err("upcoming bookings failed"))?;
        bookings_of(rows)
    }

    async fn count_by_status(&self, scope: BookingScope) -> RepoResult<BookingStats> {
        let rows: Vec<(String, i64)> = scoped(bookings::Entity::find(), scope)
            .select_only()
            .column(bookings::Column::Status)
            .column_as(Expr::col(bookings::Column::Id).count(), "count")
            .group_by(bookings::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .map_err(map_err("count bookings failed"))?;

        let mut stats = BookingStats::default();
        for (status, count) in rows {
            let status = status
                .parse::<BookingStatus>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("count bookings failed")?;
            stats.add(status, u64::try_from(count).unwrap_or(0));
        }
        Ok(stats)
    }
}

// ---------- guests ----------

pub struct SeaOrmGuestsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmGuestsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> GuestsRepository for SeaOrmGuestsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find(&self, id: Uuid) -> RepoResult<Option<Guest>> {
        let found = guests::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(map_err("find guest failed"))?;
        found
            .map(mapper::guest_to_contract)
            .transpose()
            .map_err(RepoError::from)
    }

    async fn email_taken(&self, event_id: Uuid, email: &str) -> RepoResult<bool> {
        let count = guests::Entity::find()
            .filter(guests::Column::EventId.eq(event_id))
            .filter(guests::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .map_err(map_err("email_taken failed"))?;
        Ok(count > 0)
    }

    async fn insert(&self, guest: Guest) -> RepoResult<()> {
        mapper::guest_to_active(&guest)
            .insert(&self.conn)
            .await
            .map_err(map_err("insert guest failed"))?;
        Ok(())
    }

    async fn update(&self, id: Uuid, changes: &GuestChanges) -> RepoResult<bool> {
        let mut update = guests::Entity::update_many()
            .col_expr(guests::Column::UpdatedAt, Expr::value(changes.updated_at));
        if let Some(name) = &changes.name {
            update = update.col_expr(guests::Column::Name, Expr::value(name.clone()));
        }
        if let Some(email) = &changes.email {
            update = update.col_expr(guests::Column::Email, Expr::value(email.clone()));
        }
        if let Some(user_id) = changes.user_id {
            update = update.col_expr(guests::Column::UserId, Expr::value(user_id));
        }
        if let Some(phone) = &changes.phone {
            update = update.col_expr(guests::Column::Phone, Expr::value(phone.clone()));
        }
        if let Some(dietary) = &changes.dietary_restrictions {
            update = update.col_expr(
                guests::Column::DietaryRestrictions,
                Expr::value(dietary.clone()),
            );
        }
        if let Some(status) = changes.rsvp_status {
            update = update.col_expr(guests::Column::RsvpStatus, Expr::value(status.as_str()));
        }

        let res = update
            .filter(guests::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .map_err(map_err("update guest failed"))?;
        Ok(res.rows_affected == 1)
    }

    async fn set_rsvp(&self, id: Uuid, status: RsvpStatus, at: DateTime<Utc>) -> RepoResult<bool> {
        let res = guests::Entity::update_many()
            .col_expr(guests::Column::RsvpStatus, Expr::value(status.as_str()))
            .col_expr(guests::Column::UpdatedAt, Expr::value(at))
            .filter(guests::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .map_err(map_err("set rsvp failed"))?;
        Ok(res.rows_affected == 1)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let res = guests::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(map_err("delete guest failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
        status: Option<RsvpStatus>,
    ) -> RepoResult<Vec<Guest>> {
        let mut select = guests::Entity::find().filter(guests::Column::EventId.eq(event_id));
        if let Some(status) = status {
            select = select.filter(guests::Column::RsvpStatus.eq(status.as_str()));
        }
        let rows = select
            .order_by_asc(guests::Column::CreatedAt)
            .order_by_asc(guests::Column::Name)
            .all(&self.conn)
            .await
            .map_err(map_err("list guests failed"))?;
        guests_of(rows)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Guest>> {
        let rows = guests::Entity::find()
            .filter(guests::Column::UserId.eq(user_id))
            .order_by_asc(guests::Column::CreatedAt)
            .all(&self.conn)
            .await
            .map_err(map_err("list invitations failed"))?;
        guests_of(rows)
    }

    async fn count_by_status(&self, event_id: Uuid) -> RepoResult<GuestStats> {
        let rows: Vec<(String, i64)> = guests::Entity::find()
            .select_only()
            .column(guests::Column::RsvpStatus)
            .column_as(Expr::col(guests::Column::Id).count(), "count")
            .filter(guests::Column::EventId.eq(event_id))
            .group_by(guests::Column::RsvpStatus)
            .into_tuple()
            .all(&self.conn)
            .await
            .map_err(map_err("count guests failed"))?;

        let mut stats = GuestStats::default();
        for (status, count) in rows {
            let status = status
                .parse::<RsvpStatus>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("count guests failed")?;
            stats.add(status, u64::try_from(count).unwrap_or(0));
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_messages_name_the_index() {
        let msg = r#"duplicate key value violates unique constraint "idx_bookings_vendor_committed""#;
        assert_eq!(classify_unique(msg), Some(Constraint::VendorCommittedDate));
        let msg = r#"duplicate key value violates unique constraint "idx_bookings_event_vendor""#;
        assert_eq!(classify_unique(msg), Some(Constraint::BookingEventVendor));
        let msg = r#"duplicate key value violates unique constraint "idx_guests_event_email""#;
        assert_eq!(classify_unique(msg), Some(Constraint::GuestEventEmail));
    }

    #[test]
    fn sqlite_messages_name_the_columns() {
        assert_eq!(
            classify_unique(
                "UNIQUE constraint failed: vendor_bookings.vendor_id, vendor_bookings.committed_on"
            ),
            Some(Constraint::VendorCommittedDate)
        );
        assert_eq!(
            classify_unique(
                "UNIQUE constraint failed: vendor_bookings.event_id, vendor_bookings.vendor_id"
            ),
            Some(Constraint::BookingEventVendor)
        );
        assert_eq!(
            classify_unique("UNIQUE constraint failed: guests.event_id, guests.email"),
            Some(Constraint::GuestEventEmail)
        );
        assert_eq!(classify_unique("UNIQUE constraint failed: users.email"), None);
    }
}
