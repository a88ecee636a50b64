use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Configuration for the event_bookings module (`modules.event_bookings`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventBookingsConfig {
    #[serde(default = "default_max_notes_length")]
    pub max_notes_length: usize,
    #[serde(default = "default_max_guest_name_length")]
    pub max_guest_name_length: usize,
    #[serde(default = "default_max_email_length")]
    pub max_email_length: usize,
    #[serde(default = "default_max_phone_length")]
    pub max_phone_length: usize,
    #[serde(default = "default_max_dietary_length")]
    pub max_dietary_length: usize,
    #[serde(default = "default_max_availability_window_days")]
    pub max_availability_window_days: u32,
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u32,
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: u32,
}

impl Default for EventBookingsConfig {
    fn default() -> Self {
        Self {
            max_notes_length: default_max_notes_length(),
            max_guest_name_length: default_max_guest_name_length(),
            max_email_length: default_max_email_length(),
            max_phone_length: default_max_phone_length(),
            max_dietary_length: default_max_dietary_length(),
            max_availability_window_days: default_max_availability_window_days(),
            default_list_limit: default_list_limit(),
            max_list_limit: default_max_list_limit(),
        }
    }
}

impl EventBookingsConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_list_limit == 0 {
            anyhow::bail!("max_list_limit must be positive");
        }
        if self.default_list_limit == 0 || self.default_list_limit > self.max_list_limit {
            anyhow::bail!(
                "default_list_limit must be within 1..={} (got {})",
                self.max_list_limit,
                self.default_list_limit
            );
        }
        if self.max_availability_window_days == 0 {
            anyhow::bail!("max_availability_window_days must be positive");
        }
        Ok(())
    }
}

impl From<&EventBookingsConfig> for ServiceConfig {
    fn from(cfg: &EventBookingsConfig) -> Self {
        Self {
            max_notes_length: cfg.max_notes_length,
            max_guest_name_length: cfg.max_guest_name_length,
            max_email_length: cfg.max_email_length,
            max_phone_length: cfg.max_phone_length,
            max_dietary_length: cfg.max_dietary_length,
            max_availability_window_days: cfg.max_availability_window_days,
            default_list_limit: u64::from(cfg.default_list_limit),
            max_list_limit: u64::from(cfg.max_list_limit),
            ..ServiceConfig::default()
        }
    }
}

fn default_max_notes_length() -> usize {
    1000
}

fn default_max_guest_name_length() -> usize {
    255
}

fn default_max_email_length() -> usize {
    254
}

fn default_max_phone_length() -> usize {
    20
}

fn default_max_dietary_length() -> usize {
    500
}

fn default_max_availability_window_days() -> u32 {
    366
}

fn default_list_limit() -> u32 {
    100
}

fn default_max_list_limit() -> u32 {
    1000
}
