//! Thread-safe in-memory implementation of every store trait.
//!
//! Bookings live under a single mutex, so the overlap check and the write in
//! [`BookingStore::insert_booking_if_free`] cannot interleave with another
//! insert. Used by tests, the CLI, and as a reference for real adapters.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::interval::TimeRange;
use crate::model::{Booking, BookingStatus, EventType};
use crate::store::{
    BookingIndex, BookingStore, EventTypeStore, InsertOutcome, StoreResult, TemplateStore,
};
use crate::template::AvailabilityTemplate;

/// Full contents of an [`InMemoryStore`], for import and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub templates: Vec<AvailabilityTemplate>,
    #[serde(default)]
    pub event_types: Vec<EventType>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    templates: RwLock<HashMap<String, AvailabilityTemplate>>,
    event_types: RwLock<HashMap<Uuid, EventType>>,
    bookings: Mutex<HashMap<String, Vec<Booking>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let templates = snapshot
            .templates
            .into_iter()
            .map(|t| (t.owner_id.clone(), t))
            .collect();
        let event_types = snapshot.event_types.into_iter().map(|e| (e.id, e)).collect();

        let mut bookings: HashMap<String, Vec<Booking>> = HashMap::new();
        for booking in snapshot.bookings {
            bookings.entry(booking.owner_id.clone()).or_default().push(booking);
        }

        Self {
            templates: RwLock::new(templates),
            event_types: RwLock::new(event_types),
            bookings: Mutex::new(bookings),
        }
    }

    /// Export everything, sorted for stable output.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        let mut templates: Vec<AvailabilityTemplate> =
            self.templates.read().map_err(|_| StoreError::Poisoned)?.values().cloned().collect();
        templates.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));

        let mut event_types: Vec<EventType> =
            self.event_types.read().map_err(|_| StoreError::Poisoned)?.values().cloned().collect();
        event_types.sort_by(|a, b| {
            (&a.owner_id, &a.title, a.id).cmp(&(&b.owner_id, &b.title, b.id))
        });

        let mut bookings: Vec<Booking> = self
            .bookings
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .values()
            .flatten()
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.start_time, b.id));

        Ok(Snapshot {
            templates,
            event_types,
            bookings,
        })
    }

    pub fn put_template(&self, template: AvailabilityTemplate) -> StoreResult<()> {
        self.templates
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(template.owner_id.clone(), template);
        Ok(())
    }

    pub fn put_event_type(&self, event: EventType) -> StoreResult<()> {
        self.event_types
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(event.id, event);
        Ok(())
    }

    /// Store a booking unconditionally (imports and fixtures). Use
    /// [`BookingStore::insert_booking_if_free`] for commits.
    pub fn put_booking(&self, booking: Booking) -> StoreResult<()> {
        self.bookings
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .entry(booking.owner_id.clone())
            .or_default()
            .push(booking);
        Ok(())
    }

    /// Every booking of `owner_id`, cancelled ones included.
    pub fn all_bookings(&self, owner_id: &str) -> StoreResult<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .get(owner_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl TemplateStore for InMemoryStore {
    fn get_availability_template(
        &self,
        owner_id: &str,
    ) -> StoreResult<Option<AvailabilityTemplate>> {
        Ok(self
            .templates
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .get(owner_id)
            .cloned())
    }
}

impl EventTypeStore for InMemoryStore {
    fn get_event_type(&self, event_type_id: Uuid) -> StoreResult<Option<EventType>> {
        Ok(self
            .event_types
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .get(&event_type_id)
            .cloned())
    }

    fn list_event_types(&self, owner_id: &str) -> StoreResult<Vec<EventType>> {
        let mut events: Vec<EventType> = self
            .event_types
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(events)
    }
}

impl BookingIndex for InMemoryStore {
    fn list_bookings(&self, owner_id: &str, range: &TimeRange) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.lock().map_err(|_| StoreError::Poisoned)?;
        let mut found: Vec<Booking> = bookings
            .get(owner_id)
            .map(|list| {
                list.iter()
                    .filter(|b| b.is_active() && b.range().overlaps(range))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by_key(|b| (b.start_time, b.id));
        Ok(found)
    }
}

impl BookingStore for InMemoryStore {
    fn insert_booking_if_free(&self, booking: Booking) -> StoreResult<InsertOutcome> {
        let mut bookings = self.bookings.lock().map_err(|_| StoreError::Poisoned)?;
        let owned = bookings.entry(booking.owner_id.clone()).or_default();

        let candidate = booking.range();
        if owned
            .iter()
            .any(|b| b.is_active() && b.range().overlaps(&candidate))
        {
            return Ok(InsertOutcome::Conflict);
        }

        owned.push(booking.clone());
        Ok(InsertOutcome::Inserted(booking))
    }

    fn mark_cancelled(&self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        let mut bookings = self.bookings.lock().map_err(|_| StoreError::Poisoned)?;
        let found = bookings
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|b| b.id == booking_id);

        Ok(found.map(|booking| {
            booking.status = BookingStatus::Cancelled;
            booking.clone()
        }))
    }
}
