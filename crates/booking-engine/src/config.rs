//! Engine configuration.
//!
//! Defaults suit a single-zone deployment with half-hour slots. Every field can
//! be overridden from the environment with [`EngineConfig::from_env`] or from a
//! serialized config object.

use std::env;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};

pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 30;
pub const DEFAULT_MAX_RANGE_DAYS: u32 = 62;
const MINUTES_PER_DAY: u32 = 1440;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Step between candidate slot starts, independent of event duration.
    pub slot_granularity_minutes: u32,
    /// IANA zone in which template times and slot dates are interpreted.
    pub timezone: String,
    /// Largest number of calendar days a single availability query may span.
    pub max_range_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slot_granularity_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
            timezone: "UTC".to_string(),
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

impl EngineConfig {
    /// Read `BOOKING_SLOT_GRANULARITY_MINUTES`, `BOOKING_TIMEZONE` and
    /// `BOOKING_MAX_RANGE_DAYS`, falling back to the defaults for unset variables.
    ///
    /// # Errors
    /// Returns `BookingError::InvalidRequest` if a variable is set but malformed
    /// or the resulting config fails [`EngineConfig::validate`].
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = env::var("BOOKING_SLOT_GRANULARITY_MINUTES") {
            config.slot_granularity_minutes =
                parse_number("BOOKING_SLOT_GRANULARITY_MINUTES", &raw)?;
        }
        if let Ok(raw) = env::var("BOOKING_TIMEZONE") {
            config.timezone = raw;
        }
        if let Ok(raw) = env::var("BOOKING_MAX_RANGE_DAYS") {
            config.max_range_days = parse_number("BOOKING_MAX_RANGE_DAYS", &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_granularity_minutes == 0 || self.slot_granularity_minutes > MINUTES_PER_DAY {
            return Err(BookingError::InvalidRequest(format!(
                "slot granularity must be between 1 and {MINUTES_PER_DAY} minutes, got {}",
                self.slot_granularity_minutes
            )));
        }
        if self.max_range_days == 0 {
            return Err(BookingError::InvalidRequest(
                "max range days must be positive".to_string(),
            ));
        }
        self.tz()?;
        Ok(())
    }

    /// The parsed reference time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| {
                BookingError::InvalidRequest(format!("invalid timezone: {}", self.timezone))
            })
    }
}

fn parse_number(name: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| BookingError::InvalidRequest(format!("{name} must be a number, got '{raw}'")))
}
