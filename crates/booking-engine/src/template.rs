//! Weekly availability templates.
//!
//! A host publishes one [`AvailabilityTemplate`]: a working window per weekday
//! plus the minimum lead time between "now" and a bookable slot. Rules are kept
//! in a fixed seven-entry array indexed by [`chrono::Weekday`], so every weekday
//! always has exactly one rule.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};

/// Working hours for a single weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRule {
    pub is_available: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl DayRule {
    /// An available day from `start` to `end` (wall clock, reference time zone).
    pub fn open(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            is_available: true,
            start_time: start,
            end_time: end,
        }
    }

    /// A day with no bookable time.
    pub fn closed() -> Self {
        Self {
            is_available: false,
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN,
        }
    }

    /// Window length in minutes, or 0 when the day is closed.
    pub fn window_minutes(&self) -> i64 {
        if !self.is_available || self.end_time <= self.start_time {
            return 0;
        }
        (self.end_time - self.start_time).num_minutes()
    }
}

impl Default for DayRule {
    fn default() -> Self {
        Self::closed()
    }
}

/// Seven day rules indexed Monday..Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "WeekdayMap", into = "WeekdayMap")]
pub struct WeeklyRules([DayRule; 7]);

impl WeeklyRules {
    pub fn get(&self, day: Weekday) -> &DayRule {
        &self.0[day.num_days_from_monday() as usize]
    }

    pub fn set(&mut self, day: Weekday, rule: DayRule) {
        self.0[day.num_days_from_monday() as usize] = rule;
    }

    /// Iterate `(weekday, rule)` pairs starting from Monday.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DayRule)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, rule)| (weekday_from_index(i), rule))
    }
}

fn weekday_from_index(i: usize) -> Weekday {
    match i {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// Wire shape of [`WeeklyRules`]: one named key per weekday.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WeekdayMap {
    #[serde(default)]
    monday: DayRule,
    #[serde(default)]
    tuesday: DayRule,
    #[serde(default)]
    wednesday: DayRule,
    #[serde(default)]
    thursday: DayRule,
    #[serde(default)]
    friday: DayRule,
    #[serde(default)]
    saturday: DayRule,
    #[serde(default)]
    sunday: DayRule,
}

impl From<WeekdayMap> for WeeklyRules {
    fn from(m: WeekdayMap) -> Self {
        WeeklyRules([
            m.monday,
            m.tuesday,
            m.wednesday,
            m.thursday,
            m.friday,
            m.saturday,
            m.sunday,
        ])
    }
}

impl From<WeeklyRules> for WeekdayMap {
    fn from(r: WeeklyRules) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = r.0;
        WeekdayMap {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }
}

/// A host's recurring weekly availability plus booking policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityTemplate {
    pub owner_id: String,
    pub days: WeeklyRules,
    /// Minimum minutes between "now" and the start of a bookable slot.
    #[serde(default)]
    pub min_lead_minutes: u32,
}

impl AvailabilityTemplate {
    /// A template with every day closed and no lead time.
    pub fn closed(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            days: WeeklyRules::default(),
            min_lead_minutes: 0,
        }
    }

    /// Monday to Friday, 09:00-17:00, no lead time. This is what a new host starts with.
    pub fn standard(owner_id: impl Into<String>) -> Self {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN);
        let mut template = Self::closed(owner_id);
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            template.days.set(day, DayRule::open(nine, five));
        }
        template
    }

    pub fn with_day(mut self, day: Weekday, rule: DayRule) -> Self {
        self.days.set(day, rule);
        self
    }

    pub fn with_lead_minutes(mut self, minutes: u32) -> Self {
        self.min_lead_minutes = minutes;
        self
    }

    pub fn rule_for(&self, day: Weekday) -> &DayRule {
        self.days.get(day)
    }

    /// Check that every available day has `start_time < end_time`.
    ///
    /// # Errors
    /// Returns `BookingError::InvalidRequest` naming the first offending weekday.
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(BookingError::InvalidRequest(
                "template owner id is empty".to_string(),
            ));
        }
        for (day, rule) in self.days.iter() {
            if rule.is_available && rule.start_time >= rule.end_time {
                return Err(BookingError::InvalidRequest(format!(
                    "{day}: start time {} must be before end time {}",
                    rule.start_time.format("%H:%M"),
                    rule.end_time.format("%H:%M"),
                )));
            }
        }
        Ok(())
    }
}
