//! Booking commits and cancellations.
//!
//! A commit never trusts what the guest saw: availability is re-derived from
//! the template at commit time, existing bookings are re-read, and the final
//! write is the store's atomic conditional insert. Losing that last race is an
//! ordinary [`BookingError::SlotUnavailable`], not a failure.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BookingError, Result};
use crate::interval::{find_conflicts, TimeRange};
use crate::model::{Booking, BookingRequest, BookingStatus};
use crate::slots::SlotGenerator;
use crate::store::{BookingStore, EventTypeStore, InsertOutcome, TemplateStore};

pub struct BookingCommitter<'a, T, E, B>
where
    T: TemplateStore + ?Sized,
    E: EventTypeStore + ?Sized,
    B: BookingStore + ?Sized,
{
    templates: &'a T,
    events: &'a E,
    bookings: &'a B,
    generator: SlotGenerator,
}

impl<'a, T, E, B> BookingCommitter<'a, T, E, B>
where
    T: TemplateStore + ?Sized,
    E: EventTypeStore + ?Sized,
    B: BookingStore + ?Sized,
{
    pub fn new(templates: &'a T, events: &'a E, bookings: &'a B, generator: SlotGenerator) -> Self {
        Self {
            templates,
            events,
            bookings,
            generator,
        }
    }

    /// Validate `request` and commit it as a confirmed booking.
    ///
    /// Checks run in order and stop at the first failure:
    /// 1. the event type exists (`NotFound`);
    /// 2. `end - start` equals the event duration, and the guest fields are
    ///    well formed (`InvalidRequest`). No store is queried before this passes;
    /// 3. `start` is one of the slots the host's template yields for that date
    ///    at `now`, lead time included (`SlotUnavailable`);
    /// 4. no confirmed booking of the host overlaps the interval (`SlotUnavailable`);
    /// 5. the conditional insert succeeds (`SlotUnavailable` on conflict).
    pub fn commit_booking(&self, request: BookingRequest, now: DateTime<Utc>) -> Result<Booking> {
        let event = self
            .events
            .get_event_type(request.event_type_id)?
            .ok_or_else(|| {
                BookingError::NotFound(format!("event type {}", request.event_type_id))
            })?;

        let requested = TimeRange::new(request.start_time, request.end_time);
        if requested.end - requested.start != event.duration() {
            return Err(BookingError::InvalidRequest(format!(
                "booking must last exactly {} minutes, got {}",
                event.duration_minutes,
                requested.duration_minutes()
            )));
        }
        request.validate_guest()?;

        let template = self
            .templates
            .get_availability_template(&event.owner_id)?
            .ok_or_else(|| {
                BookingError::SlotUnavailable(format!(
                    "host {} has not published availability",
                    event.owner_id
                ))
            })?;

        let (date, _) = self.generator.to_local(requested.start);
        let offered = self
            .generator
            .generate_slots(&template, date, event.duration_minutes, now)
            .iter()
            .any(|slot| slot.start_time == requested.start);
        if !offered {
            debug!(
                owner = %event.owner_id,
                start = %requested.start,
                "start is not an offered slot"
            );
            return Err(BookingError::SlotUnavailable(format!(
                "{} is not an available slot",
                requested.start.to_rfc3339()
            )));
        }

        let existing = self.bookings.list_bookings(&event.owner_id, &requested)?;
        let conflicts = find_conflicts(&requested, &existing);
        if let Some(conflict) = conflicts.first() {
            warn!(
                owner = %event.owner_id,
                start = %requested.start,
                conflicting = %conflict.booking.id,
                overlap_minutes = conflict.overlap_minutes,
                "booking rejected: slot already taken"
            );
            return Err(BookingError::SlotUnavailable(format!(
                "{} overlaps an existing booking",
                requested.start.to_rfc3339()
            )));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            event_type_id: event.id,
            owner_id: event.owner_id.clone(),
            guest_name: request.guest_name.trim().to_string(),
            guest_email: request.guest_email.trim().to_string(),
            start_time: requested.start,
            end_time: requested.end,
            additional_info: request.additional_info.filter(|s| !s.trim().is_empty()),
            status: BookingStatus::Confirmed,
        };

        match self.bookings.insert_booking_if_free(booking)? {
            InsertOutcome::Inserted(created) => {
                info!(
                    booking = %created.id,
                    owner = %created.owner_id,
                    event = %created.event_type_id,
                    start = %created.start_time,
                    "booking committed"
                );
                Ok(created)
            }
            InsertOutcome::Conflict => {
                warn!(
                    owner = %event.owner_id,
                    start = %requested.start,
                    "booking lost insert race"
                );
                Err(BookingError::SlotUnavailable(format!(
                    "{} was booked by someone else",
                    requested.start.to_rfc3339()
                )))
            }
        }
    }

    /// Cancel a booking. Cancelling twice is a no-op success.
    ///
    /// # Errors
    /// `NotFound` when no booking has that id.
    pub fn cancel_booking(&self, booking_id: Uuid) -> Result<Booking> {
        let booking = self
            .bookings
            .mark_cancelled(booking_id)?
            .ok_or_else(|| BookingError::NotFound(format!("booking {booking_id}")))?;
        info!(booking = %booking.id, owner = %booking.owner_id, "booking cancelled");
        Ok(booking)
    }
}
