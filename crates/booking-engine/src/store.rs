//! Storage collaborators consumed by the engine.
//!
//! The engine never persists anything itself. It reads templates and event
//! types, reads bookings through [`BookingIndex`], and commits through the
//! single conditional insert [`BookingStore::insert_booking_if_free`], which
//! must be atomic per host.

use uuid::Uuid;

use crate::error::StoreError;
use crate::interval::TimeRange;
use crate::model::{Booking, EventType};
use crate::template::AvailabilityTemplate;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait TemplateStore: Send + Sync {
    fn get_availability_template(
        &self,
        owner_id: &str,
    ) -> StoreResult<Option<AvailabilityTemplate>>;
}

pub trait EventTypeStore: Send + Sync {
    fn get_event_type(&self, event_type_id: Uuid) -> StoreResult<Option<EventType>>;

    fn list_event_types(&self, owner_id: &str) -> StoreResult<Vec<EventType>>;
}

/// Read side of the booking store.
pub trait BookingIndex: Send + Sync {
    /// All non-cancelled bookings of `owner_id` whose interval intersects `range`.
    fn list_bookings(&self, owner_id: &str, range: &TimeRange) -> StoreResult<Vec<Booking>>;
}

/// Result of a conditional insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Booking),
    /// An active booking of the same host overlaps the candidate. Nothing was written.
    Conflict,
}

pub trait BookingStore: BookingIndex {
    /// Insert `booking` unless an active booking of the same owner overlaps it.
    /// The check and the write must happen as one atomic step per owner.
    fn insert_booking_if_free(&self, booking: Booking) -> StoreResult<InsertOutcome>;

    /// Mark a booking cancelled. Cancelling an already-cancelled booking is a
    /// no-op. Returns `None` when no booking has that id.
    fn mark_cancelled(&self, booking_id: Uuid) -> StoreResult<Option<Booking>>;
}
