//! Free-slot resolution: template candidates minus existing bookings.
//!
//! For each date the [`SlotGenerator`] produces candidates (weekly rules plus
//! lead time), the [`BookingIndex`] supplies that day's confirmed bookings, and
//! every candidate overlapping a booking is dropped. Dates left with no slots
//! are omitted from the result entirely.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::error::{BookingError, Result};
use crate::interval::{merge_busy_periods, overlaps_any, TimeRange};
use crate::model::{EventType, Slot};
use crate::slots::SlotGenerator;
use crate::store::BookingIndex;
use crate::template::AvailabilityTemplate;

/// Free start times keyed by date. A missing date means "no availability".
pub type AvailabilityMap = BTreeMap<NaiveDate, Vec<NaiveTime>>;

pub struct AvailabilityResolver<'a, I: BookingIndex + ?Sized> {
    index: &'a I,
    generator: SlotGenerator,
}

impl<'a, I: BookingIndex + ?Sized> AvailabilityResolver<'a, I> {
    pub fn new(index: &'a I, generator: SlotGenerator) -> Self {
        Self { index, generator }
    }

    /// Free start times for every date in `from..=to`.
    ///
    /// Dates before today (in the reference zone) are skipped.
    ///
    /// # Errors
    /// - `InvalidRequest` if `from > to` or the event belongs to another host.
    /// - `DependencyFailure` if the booking index cannot be read.
    pub fn resolve_available_slots(
        &self,
        template: &AvailabilityTemplate,
        event_type: &EventType,
        from: NaiveDate,
        to: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<AvailabilityMap> {
        if from > to {
            return Err(BookingError::InvalidRequest(format!(
                "date range is inverted: {from} is after {to}"
            )));
        }
        if event_type.owner_id != template.owner_id {
            return Err(BookingError::InvalidRequest(format!(
                "event type {} does not belong to host {}",
                event_type.id, template.owner_id
            )));
        }

        let today = self.generator.today(now);
        let mut availability = AvailabilityMap::new();

        for date in from.iter_days().take_while(|d| *d <= to) {
            if date < today {
                continue;
            }
            let slots = self.free_slots_on(template, event_type, date, now)?;
            if !slots.is_empty() {
                availability.insert(date, slots.into_iter().map(|s| s.time).collect());
            }
        }

        debug!(
            owner = %template.owner_id,
            event = %event_type.id,
            %from,
            %to,
            days = availability.len(),
            "resolved availability"
        );
        Ok(availability)
    }

    /// Free slots on a single date, as absolute instants.
    pub fn free_slots_on(
        &self,
        template: &AvailabilityTemplate,
        event_type: &EventType,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Slot>> {
        let candidates =
            self.generator
                .generate_slots(template, date, event_type.duration_minutes, now);

        // Slots are ascending, so the first start and the latest end bound the query.
        let (Some(first), Some(latest_end)) = (
            candidates.first(),
            candidates.iter().map(|s| s.end_time).max(),
        ) else {
            return Ok(Vec::new());
        };
        let window = TimeRange::new(first.start_time, latest_end);

        let bookings = self.index.list_bookings(&template.owner_id, &window)?;
        let busy = merge_busy_periods(&bookings, &window);

        let total = candidates.len();
        let free: Vec<Slot> = candidates
            .into_iter()
            .filter(|slot| !overlaps_any(&slot.range(), &busy))
            .collect();

        debug!(
            owner = %template.owner_id,
            %date,
            candidates = total,
            bookings = bookings.len(),
            free = free.len(),
            "computed free slots"
        );
        Ok(free)
    }
}
