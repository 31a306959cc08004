//! # booking-engine
//!
//! Availability-to-slot computation and conflict-free booking commits.
//!
//! A host publishes a weekly [`AvailabilityTemplate`] and bookable
//! [`EventType`]s. The engine turns the template into the exact slots a guest
//! may book on any date, removes slots that collide with confirmed bookings,
//! and commits a new booking only if its slot is still free at commit time.
//! Persistence is delegated to the traits in [`store`]; [`memory`] provides a
//! thread-safe in-memory implementation.
//!
//! ## Modules
//!
//! - [`template`]: weekly availability rules and lead time
//! - [`model`]: event types, bookings, booking requests, slots
//! - [`interval`]: half-open ranges, busy-period merging, conflict detection
//! - [`slots`]: template + date + duration → candidate slots
//! - [`resolver`]: candidates minus existing bookings, per date
//! - [`committer`]: validated, race-safe commits and cancellations
//! - [`engine`]: the operations exposed to the application layer
//! - [`store`] / [`memory`]: storage collaborators
//! - [`clock`], [`config`], [`error`]

pub mod clock;
pub mod committer;
pub mod config;
pub mod engine;
pub mod error;
pub mod interval;
pub mod memory;
pub mod model;
pub mod resolver;
pub mod slots;
pub mod store;
pub mod template;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{BookingEngine, MeetingFilter};
pub use error::{BookingError, StoreError};
pub use interval::TimeRange;
pub use memory::{InMemoryStore, Snapshot};
pub use model::{Booking, BookingRequest, BookingStatus, EventType, Slot};
pub use resolver::AvailabilityMap;
pub use slots::SlotGenerator;
pub use template::{AvailabilityTemplate, DayRule};
