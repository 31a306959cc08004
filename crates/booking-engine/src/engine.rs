//! The operations exposed to the surrounding application.
//!
//! [`BookingEngine`] wires a store (anything implementing the three store
//! traits) and a [`Clock`] to the resolver and the committer. It is `Sync`
//! whenever the store is, so one engine can serve concurrent requests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::committer::BookingCommitter;
use crate::config::EngineConfig;
use crate::error::{BookingError, Result};
use crate::interval::TimeRange;
use crate::model::{Booking, BookingRequest, EventType};
use crate::resolver::{AvailabilityMap, AvailabilityResolver};
use crate::slots::SlotGenerator;
use crate::store::{BookingStore, EventTypeStore, TemplateStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingFilter {
    /// Starting now or later, soonest first.
    Upcoming,
    /// Started before now, most recent first.
    Past,
}

pub struct BookingEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    config: EngineConfig,
    generator: SlotGenerator,
}

impl<S> BookingEngine<S, SystemClock>
where
    S: TemplateStore + EventTypeStore + BookingStore,
{
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S, C> BookingEngine<S, C>
where
    S: TemplateStore + EventTypeStore + BookingStore,
    C: Clock,
{
    /// # Errors
    /// `InvalidRequest` if `config` fails validation.
    pub fn with_clock(store: S, clock: C, config: EngineConfig) -> Result<Self> {
        let generator = SlotGenerator::from_config(&config)?;
        Ok(Self {
            store,
            clock,
            config,
            generator,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Free start times for `event_type_id` of host `owner_id`, per date in
    /// `from..=to`. Dates with nothing free are absent from the map.
    ///
    /// A host without a published template has no availability (empty map).
    ///
    /// # Errors
    /// - `NotFound` if the event type does not exist or belongs to another host.
    /// - `InvalidRequest` if the range is inverted or longer than `max_range_days`.
    /// - `DependencyFailure` if a store read fails.
    pub fn resolve_available_slots(
        &self,
        owner_id: &str,
        event_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AvailabilityMap> {
        let event = self.owned_event_type(owner_id, event_type_id)?;

        if from > to {
            return Err(BookingError::InvalidRequest(format!(
                "date range is inverted: {from} is after {to}"
            )));
        }
        let span_days = (to - from).num_days() + 1;
        if span_days > self.config.max_range_days as i64 {
            return Err(BookingError::InvalidRequest(format!(
                "date range spans {span_days} days, at most {} allowed",
                self.config.max_range_days
            )));
        }

        let Some(template) = self.store.get_availability_template(owner_id)? else {
            return Ok(AvailabilityMap::new());
        };

        AvailabilityResolver::new(&self.store, self.generator).resolve_available_slots(
            &template,
            &event,
            from,
            to,
            self.clock.now(),
        )
    }

    /// Validate and commit a booking request. See [`BookingCommitter::commit_booking`].
    pub fn commit_booking(&self, request: BookingRequest) -> Result<Booking> {
        self.committer().commit_booking(request, self.clock.now())
    }

    /// Cancel a booking; idempotent.
    pub fn cancel_booking(&self, booking_id: Uuid) -> Result<Booking> {
        self.committer().cancel_booking(booking_id)
    }

    /// A host's confirmed meetings on one side of "now".
    pub fn list_meetings(&self, owner_id: &str, filter: MeetingFilter) -> Result<Vec<Booking>> {
        let now = self.clock.now();
        let mut meetings = match filter {
            MeetingFilter::Upcoming => {
                let range = TimeRange::new(now, DateTime::<Utc>::MAX_UTC);
                let mut found = self.store.list_bookings(owner_id, &range)?;
                found.retain(|b| b.start_time >= now);
                found
            }
            MeetingFilter::Past => {
                let range = TimeRange::new(DateTime::<Utc>::MIN_UTC, now);
                let mut found = self.store.list_bookings(owner_id, &range)?;
                found.retain(|b| b.start_time < now);
                found
            }
        };

        meetings.sort_by_key(|b| (b.start_time, b.id));
        if filter == MeetingFilter::Past {
            meetings.reverse();
        }
        Ok(meetings)
    }

    /// The next `limit` upcoming meetings.
    pub fn upcoming_meetings(&self, owner_id: &str, limit: usize) -> Result<Vec<Booking>> {
        let mut meetings = self.list_meetings(owner_id, MeetingFilter::Upcoming)?;
        meetings.truncate(limit);
        Ok(meetings)
    }

    /// A host's event types. Private ones are included only for the host's own view.
    pub fn list_event_types(
        &self,
        owner_id: &str,
        include_private: bool,
    ) -> Result<Vec<EventType>> {
        let mut events = self.store.list_event_types(owner_id)?;
        if !include_private {
            events.retain(|e| !e.is_private);
        }
        Ok(events)
    }

    fn owned_event_type(&self, owner_id: &str, event_type_id: Uuid) -> Result<EventType> {
        self.store
            .get_event_type(event_type_id)?
            .filter(|e| e.owner_id == owner_id)
            .ok_or_else(|| {
                BookingError::NotFound(format!("event type {event_type_id} for host {owner_id}"))
            })
    }

    fn committer(&self) -> BookingCommitter<'_, S, S, S> {
        BookingCommitter::new(&self.store, &self.store, &self.store, self.generator)
    }
}
