//! Event types, bookings, booking requests and slots.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BookingError, Result};
use crate::interval::TimeRange;

const MAX_TITLE_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 500;

/// A bookable kind of meeting offered by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: u32,
    /// Hides the event from the host's public listing. Has no effect on slots.
    #[serde(default)]
    pub is_private: bool,
}

impl EventType {
    pub fn new(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            description: String::new(),
            duration_minutes,
            is_private: false,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes as i64)
    }

    /// Check title, description and duration bounds.
    ///
    /// # Errors
    /// Returns `BookingError::InvalidRequest` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(BookingError::InvalidRequest("title is required".to_string()));
        }
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(BookingError::InvalidRequest(format!(
                "title must be at most {MAX_TITLE_CHARS} characters"
            )));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(BookingError::InvalidRequest(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        if self.duration_minutes == 0 {
            return Err(BookingError::InvalidRequest(
                "duration must be a positive number of minutes".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Cancelled,
}

/// A committed booking. The time range is a snapshot taken at commit time and
/// is never re-derived from the event type afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub event_type_id: Uuid,
    pub owner_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
}

impl Booking {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// What a guest submits when picking a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub event_type_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

impl BookingRequest {
    /// Guest fields only. Timing is checked by the committer against the event type.
    pub(crate) fn validate_guest(&self) -> Result<()> {
        if self.guest_name.trim().is_empty() {
            return Err(BookingError::InvalidRequest("guest name is required".to_string()));
        }
        if !is_plausible_email(&self.guest_email) {
            return Err(BookingError::InvalidRequest(format!(
                "'{}' is not a valid email address",
                self.guest_email
            )));
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// A bookable start time resolved to absolute instants for one event duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Slot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}
