//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use booking_engine::error::StoreError;
use booking_engine::interval::TimeRange;
use booking_engine::store::{
    BookingIndex, BookingStore, EventTypeStore, InsertOutcome, StoreResult, TemplateStore,
};
use booking_engine::{
    AvailabilityTemplate, Booking, BookingRequest, BookingStatus, DayRule, EngineConfig,
    EventType, FixedClock, InMemoryStore,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use uuid::Uuid;

pub const HOST: &str = "ana";

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// Friday 2026-03-13 12:00 UTC. The following Monday is 2026-03-16.
pub fn friday_noon() -> DateTime<Utc> {
    utc(2026, 3, 13, 12, 0)
}

pub fn next_monday() -> NaiveDate {
    date(2026, 3, 16)
}

pub fn clock() -> FixedClock {
    FixedClock(friday_noon())
}

/// Monday 09:00-17:00 only, 60 minutes lead time.
pub fn monday_template() -> AvailabilityTemplate {
    AvailabilityTemplate::closed(HOST)
        .with_day(Weekday::Mon, DayRule::open(time(9, 0), time(17, 0)))
        .with_lead_minutes(60)
}

pub fn event(minutes: u32) -> EventType {
    EventType::new(HOST, "Intro call", minutes)
}

pub fn store_with(template: AvailabilityTemplate, events: &[EventType]) -> InMemoryStore {
    let store = InMemoryStore::new();
    store.put_template(template).unwrap();
    for e in events {
        store.put_event_type(e.clone()).unwrap();
    }
    store
}

pub fn confirmed(event: &EventType, start: DateTime<Utc>) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        event_type_id: event.id,
        owner_id: event.owner_id.clone(),
        guest_name: "Existing Guest".into(),
        guest_email: "existing@example.com".into(),
        start_time: start,
        end_time: start + Duration::minutes(event.duration_minutes as i64),
        additional_info: None,
        status: BookingStatus::Confirmed,
    }
}

pub fn request(event: &EventType, start: DateTime<Utc>) -> BookingRequest {
    BookingRequest {
        event_type_id: event.id,
        guest_name: "Bruno".into(),
        guest_email: "bruno@example.com".into(),
        start_time: start,
        end_time: start + Duration::minutes(event.duration_minutes as i64),
        additional_info: None,
    }
}

pub fn config() -> EngineConfig {
    EngineConfig::default()
}

/// Delegates to an [`InMemoryStore`] and counts booking-store calls.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryStore,
    pub list_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub template_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn booking_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst) + self.insert_calls.load(Ordering::SeqCst)
    }
}

impl TemplateStore for CountingStore {
    fn get_availability_template(
        &self,
        owner_id: &str,
    ) -> StoreResult<Option<AvailabilityTemplate>> {
        self.template_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_availability_template(owner_id)
    }
}

impl EventTypeStore for CountingStore {
    fn get_event_type(&self, event_type_id: Uuid) -> StoreResult<Option<EventType>> {
        self.inner.get_event_type(event_type_id)
    }

    fn list_event_types(&self, owner_id: &str) -> StoreResult<Vec<EventType>> {
        self.inner.list_event_types(owner_id)
    }
}

impl BookingIndex for CountingStore {
    fn list_bookings(&self, owner_id: &str, range: &TimeRange) -> StoreResult<Vec<Booking>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_bookings(owner_id, range)
    }
}

impl BookingStore for CountingStore {
    fn insert_booking_if_free(&self, booking: Booking) -> StoreResult<InsertOutcome> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_booking_if_free(booking)
    }

    fn mark_cancelled(&self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        self.inner.mark_cancelled(booking_id)
    }
}

/// A store whose reads of bookings are always stale (empty), so only the
/// conditional insert can catch a conflict.
pub struct StaleIndexStore(pub InMemoryStore);

impl TemplateStore for StaleIndexStore {
    fn get_availability_template(
        &self,
        owner_id: &str,
    ) -> StoreResult<Option<AvailabilityTemplate>> {
        self.0.get_availability_template(owner_id)
    }
}

impl EventTypeStore for StaleIndexStore {
    fn get_event_type(&self, event_type_id: Uuid) -> StoreResult<Option<EventType>> {
        self.0.get_event_type(event_type_id)
    }

    fn list_event_types(&self, owner_id: &str) -> StoreResult<Vec<EventType>> {
        self.0.list_event_types(owner_id)
    }
}

impl BookingIndex for StaleIndexStore {
    fn list_bookings(&self, _owner_id: &str, _range: &TimeRange) -> StoreResult<Vec<Booking>> {
        Ok(Vec::new())
    }
}

impl BookingStore for StaleIndexStore {
    fn insert_booking_if_free(&self, booking: Booking) -> StoreResult<InsertOutcome> {
        self.0.insert_booking_if_free(booking)
    }

    fn mark_cancelled(&self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        self.0.mark_cancelled(booking_id)
    }
}

/// A store whose booking index is down.
pub struct BrokenIndexStore(pub InMemoryStore);

impl TemplateStore for BrokenIndexStore {
    fn get_availability_template(
        &self,
        owner_id: &str,
    ) -> StoreResult<Option<AvailabilityTemplate>> {
        self.0.get_availability_template(owner_id)
    }
}

impl EventTypeStore for BrokenIndexStore {
    fn get_event_type(&self, event_type_id: Uuid) -> StoreResult<Option<EventType>> {
        self.0.get_event_type(event_type_id)
    }

    fn list_event_types(&self, owner_id: &str) -> StoreResult<Vec<EventType>> {
        self.0.list_event_types(owner_id)
    }
}

impl BookingIndex for BrokenIndexStore {
    fn list_bookings(&self, _owner_id: &str, _range: &TimeRange) -> StoreResult<Vec<Booking>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

impl BookingStore for BrokenIndexStore {
    fn insert_booking_if_free(&self, _booking: Booking) -> StoreResult<InsertOutcome> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn mark_cancelled(&self, _booking_id: Uuid) -> StoreResult<Option<Booking>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}
