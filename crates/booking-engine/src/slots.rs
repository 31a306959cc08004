//! Weekly template → candidate slot expansion.
//!
//! Pure functions over value types: the same template, date, duration and
//! "now" always yield the same ordered slots.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::Slot;
use crate::template::AvailabilityTemplate;

/// Expands an [`AvailabilityTemplate`] into the slots of one calendar date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGenerator {
    granularity_minutes: u32,
    tz: Tz,
}

impl SlotGenerator {
    pub fn new(granularity_minutes: u32, tz: Tz) -> Self {
        Self {
            granularity_minutes: granularity_minutes.max(1),
            tz,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.slot_granularity_minutes, config.tz()?))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Start times on `date` at which a `duration_minutes` meeting fits entirely
    /// inside the weekday's window, stepping from the window start by the slot
    /// granularity. No lead-time filtering.
    ///
    /// Returns an empty list when the weekday is unavailable, when the duration
    /// is zero, or when the duration exceeds the window.
    pub fn candidate_times(
        &self,
        template: &AvailabilityTemplate,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Vec<NaiveTime> {
        let rule = template.rule_for(date.weekday());
        let duration_minutes = i64::from(duration_minutes);
        if duration_minutes == 0 || duration_minutes > rule.window_minutes() {
            return Vec::new();
        }

        let window_start = i64::from(rule.start_time.num_seconds_from_midnight());
        let window_end = i64::from(rule.end_time.num_seconds_from_midnight());
        let duration = duration_minutes * 60;
        let step = i64::from(self.granularity_minutes) * 60;

        let mut times = Vec::new();
        let mut cursor = window_start;
        while cursor + duration <= window_end {
            let time = u32::try_from(cursor)
                .ok()
                .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, 0));
            if let Some(time) = time {
                times.push(time);
            }
            cursor += step;
        }
        times
    }

    /// Bookable slots on `date`: candidate times resolved to absolute instants,
    /// keeping only those starting at or after `now + template.min_lead_minutes`.
    ///
    /// Local times that fall in a DST gap are skipped; ambiguous local times use
    /// the earlier instant.
    pub fn generate_slots(
        &self,
        template: &AvailabilityTemplate,
        date: NaiveDate,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> Vec<Slot> {
        let cutoff = now + Duration::minutes(template.min_lead_minutes as i64);
        let duration = Duration::minutes(duration_minutes as i64);

        self.candidate_times(template, date, duration_minutes)
            .into_iter()
            .filter_map(|time| {
                let start = self.to_instant(date, time)?;
                (start >= cutoff).then(|| Slot {
                    date,
                    time,
                    start_time: start,
                    end_time: start + duration,
                })
            })
            .collect()
    }

    /// The absolute instant of a wall-clock `date` + `time` in the reference zone.
    pub fn to_instant(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        self.tz
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The reference-zone calendar date and wall-clock time of an instant.
    pub fn to_local(&self, instant: DateTime<Utc>) -> (NaiveDate, NaiveTime) {
        let local = instant.with_timezone(&self.tz).naive_local();
        (local.date(), local.time())
    }

    /// Today's date in the reference zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.to_local(now).0
    }

    /// `[00:00 of date, 00:00 of the next day)` as absolute instants.
    pub fn day_bounds(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let next = date.succ_opt()?;
        let start = self.day_start(date)?;
        let end = self.day_start(next)?;
        Some((start, end))
    }

    fn day_start(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        // Midnight can fall in a DST gap in some zones; take the first valid instant.
        (0..24).find_map(|hour| {
            NaiveTime::from_hms_opt(hour, 0, 0).and_then(|t| self.to_instant(date, t))
        })
    }
}

impl Default for SlotGenerator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SLOT_GRANULARITY_MINUTES, chrono_tz::UTC)
    }
}
