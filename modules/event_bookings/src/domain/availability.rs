use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::contract::model::DateRange;
use crate::domain::error::DomainError;
use crate::domain::repo::{BookingsRepository, Directory};

/// Derived view over committed bookings: which days a vendor is taken.
///
/// Holds no state of its own. As a write guard it is only a pre-check; the
/// store's unique (vendor, committed date) index is what actually holds under races.
#[derive(Clone)]
pub struct AvailabilityIndex {
    bookings: Arc<dyn BookingsRepository>,
    directory: Arc<dyn Directory>,
    max_window_days: u32,
}

impl AvailabilityIndex {
    pub fn new(
        bookings: Arc<dyn BookingsRepository>,
        directory: Arc<dyn Directory>,
        max_window_days: u32,
    ) -> Self {
        Self {
            bookings,
            directory,
            max_window_days,
        }
    }

    #[instrument(
        name = "event_bookings.availability.is_available",
        skip(self),
        fields(vendor_id = %vendor_id, date = %date)
    )]
    pub async fn is_available(&self, vendor_id: Uuid, date: NaiveDate) -> Result<bool, DomainError> {
        self.ensure_vendor(vendor_id).await?;
        let taken = self.bookings.is_vendor_committed_on(vendor_id, date).await?;
        debug!(available = !taken, "availability checked");
        Ok(!taken)
    }

    /// Fails with `VendorUnavailable` if the vendor already holds `date`.
    pub async fn ensure_available(&self, vendor_id: Uuid, date: NaiveDate) -> Result<(), DomainError> {
        if self.bookings.is_vendor_committed_on(vendor_id, date).await? {
            debug!(%vendor_id, %date, "vendor already committed");
            return Err(DomainError::vendor_unavailable(vendor_id, date));
        }
        Ok(())
    }

    #[instrument(
        name = "event_bookings.availability.unavailable_dates",
        skip(self),
        fields(vendor_id = %vendor_id, from = %range.from, to = %range.to)
    )]
    pub async fn unavailable_dates(
        &self,
        vendor_id: Uuid,
        range: DateRange,
    ) -> Result<BTreeSet<NaiveDate>, DomainError> {
        self.validate_range(range)?;
        self.ensure_vendor(vendor_id).await?;
        let dates = self.bookings.committed_dates(vendor_id, range).await?;
        debug!(count = dates.len(), "unavailable dates loaded");
        Ok(dates)
    }

    fn validate_range(&self, range: DateRange) -> Result<(), DomainError> {
        if range.from > range.to {
            return Err(DomainError::validation(
                "date_range",
                format!("start {} is after end {}", range.from, range.to),
            ));
        }
        if range.len_days() > i64::from(self.max_window_days) {
            return Err(DomainError::validation(
                "date_range",
                format!(
                    "spans {} days (max: {})",
                    range.len_days(),
                    self.max_window_days
                ),
            ));
        }
        Ok(())
    }

    async fn ensure_vendor(&self, vendor_id: Uuid) -> Result<(), DomainError> {
        self.directory
            .find_vendor(vendor_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::vendor_not_found(vendor_id))
    }
}
