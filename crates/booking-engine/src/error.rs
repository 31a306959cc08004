//! Error types for booking-engine operations.

use thiserror::Error;

/// Failure reported by a storage collaborator (template, event or booking store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Unknown event type, booking or host.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or internally inconsistent request (e.g. mismatched duration).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested interval is not free: outside the weekly rules, inside the
    /// lead time, or overlapping a confirmed booking.
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    /// A collaborator call failed. Transient; the caller decides whether to retry.
    #[error("Dependency failure: {0}")]
    DependencyFailure(#[from] StoreError),
}

impl BookingError {
    /// Only collaborator failures are worth retrying; every other kind is a
    /// final answer for the given input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::DependencyFailure(_))
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
