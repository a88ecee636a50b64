use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// ---------- collaborators (read-only from this module) ----------

/// Registered user with its role flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub is_planner: bool,
    pub is_vendor: bool,
}

/// Service provider, one-to-one with a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub verified: bool,
}

/// Priced offering of a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub price: Decimal,
}

// ---------- identity ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Planner,
    Vendor,
}

/// Acting user with roles resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub roles: BTreeSet<Role>,
}

impl Actor {
    pub fn new(user_id: Uuid, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl From<&UserAccount> for Actor {
    fn from(user: &UserAccount) -> Self {
        let mut roles = BTreeSet::new();
        if user.is_planner {
            roles.insert(Role::Planner);
        }
        if user.is_vendor {
            roles.insert(Role::Vendor);
        }
        Self {
            user_id: user.id,
            roles,
        }
    }
}

// ---------- events ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub planner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Calendar day the vendors are reserved for.
    pub fn calendar_date(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: String,
}

/// Partial update of an event. The planner cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

// ---------- bookings ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// A committed booking holds the vendor's calendar date.
    pub fn is_committed(self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub vendor_id: Uuid,
    pub service_id: Uuid,
    pub status: BookingStatus,
    pub notes: Option<String>,
    /// Calendar date of the event at the time of the last write.
    pub event_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub event_id: Uuid,
    pub vendor_id: Uuid,
    pub service_id: Uuid,
    pub notes: Option<String>,
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }

    /// Number of days covered; zero when `from > to`.
    pub fn len_days(&self) -> i64 {
        if self.from > self.to {
            0
        } else {
            (self.to - self.from).num_days() + 1
        }
    }
}

/// Conjunctive booking filter; unset fields match everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingFilter {
    pub event_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub planner_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub date_range: Option<DateRange>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Whose bookings a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    Vendor(Uuid),
    Planner(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookingStats {
    pub total: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl BookingStats {
    pub fn add(&mut self, status: BookingStatus, count: u64) {
        match status {
            BookingStatus::Pending => self.pending += count,
            BookingStatus::Confirmed => self.confirmed += count,
            BookingStatus::Completed => self.completed += count,
            BookingStatus::Cancelled => self.cancelled += count,
        }
        self.total += count;
    }
}

// ---------- guests ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsvpStatus {
    Invited,
    Attending,
    Declined,
    Waitlist,
}

impl RsvpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RsvpStatus::Invited => "INVITED",
            RsvpStatus::Attending => "ATTENDING",
            RsvpStatus::Declined => "DECLINED",
            RsvpStatus::Waitlist => "WAITLIST",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INVITED" => Ok(RsvpStatus::Invited),
            "ATTENDING" => Ok(RsvpStatus::Attending),
            "DECLINED" => Ok(RsvpStatus::Declined),
            "WAITLIST" => Ok(RsvpStatus::Waitlist),
            other => Err(format!("unknown rsvp status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Registered user with the same email, if any.
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub rsvp_status: RsvpStatus,
    pub dietary_restrictions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dietary_restrictions: Option<String>,
}

/// Partial guest update. An empty `phone` or `dietary_restrictions` clears the field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuestPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub rsvp_status: Option<RsvpStatus>,
}

/// Guest counts per RSVP answer. WAITLIST is reported in `waitlisted`, not in
/// `pending`, so `total == attending + declined + pending + waitlisted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuestStats {
    pub total: u64,
    pub attending: u64,
    pub declined: u64,
    /// Invited but not yet answered.
    pub pending: u64,
    pub waitlisted: u64,
}

impl GuestStats {
    pub fn add(&mut self, status: RsvpStatus, count: u64) {
        match status {
            RsvpStatus::Invited => self.pending += count,
            RsvpStatus::Attending => self.attending += count,
            RsvpStatus::Declined => self.declined += count,
            RsvpStatus::Waitlist => self.waitlisted += count,
        }
        self.total += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for s in BookingStatus::ALL {
            assert_eq!(s.as_str().parse::<BookingStatus>().unwrap(), s);
        }
        assert_eq!("attending".parse::<RsvpStatus>().unwrap(), RsvpStatus::Attending);
        assert!("MAYBE".parse::<RsvpStatus>().is_err());
    }

    #[test]
    fn committed_statuses() {
        assert!(BookingStatus::Confirmed.is_committed());
        assert!(BookingStatus::Completed.is_committed());
        assert!(!BookingStatus::Pending.is_committed());
        assert!(!BookingStatus::Cancelled.is_committed());
    }

    #[test]
    fn date_range_length() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(DateRange::single(d("2025-06-01")).len_days(), 1);
        assert_eq!(DateRange::new(d("2025-06-01"), d("2025-06-30")).len_days(), 30);
        assert_eq!(DateRange::new(d("2025-06-02"), d("2025-06-01")).len_days(), 0);
        assert!(DateRange::new(d("2025-06-01"), d("2025-06-03")).contains(d("2025-06-03")));
    }

    #[test]
    fn guest_stats_total_is_sum() {
        let mut stats = GuestStats::default();
        stats.add(RsvpStatus::Attending, 3);
        stats.add(RsvpStatus::Declined, 1);
        stats.add(RsvpStatus::Invited, 2);
        stats.add(RsvpStatus::Waitlist, 4);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.waitlisted, 4);
        assert_eq!(
            stats.total,
            stats.attending + stats.declined + stats.pending + stats.waitlisted
        );
    }

    #[test]
    fn actor_roles_follow_flags() {
        let user = UserAccount {
            id: Uuid::new_v4(),
            email: "p@example.com".into(),
            display_name: "P".into(),
            is_planner: true,
            is_vendor: false,
        };
        let actor = Actor::from(&user);
        assert!(actor.has_role(Role::Planner));
        assert!(!actor.has_role(Role::Vendor));
    }
}
