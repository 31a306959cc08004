//! Half-open time ranges, busy-period merging and conflict detection.
//!
//! All ranges are `[start, end)`. Two ranges overlap iff
//! `a.start < b.end && b.start < a.end`, so back-to-back bookings (one ends
//! exactly when the next starts) are NOT conflicts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Booking;

/// A half-open `[start, end)` interval of absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes shared by both ranges, or 0 when they do not overlap.
    pub fn overlap_minutes(&self, other: &TimeRange) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        (self.end.min(other.end) - self.start.max(other.start)).num_minutes()
    }
}

/// An existing booking that collides with a requested range.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub booking: Booking,
    pub overlap_minutes: i64,
}

/// Find every active booking that overlaps `requested`.
///
/// Cancelled bookings never conflict.
pub fn find_conflicts(requested: &TimeRange, bookings: &[Booking]) -> Vec<Conflict> {
    bookings
        .iter()
        .filter(|b| b.is_active())
        .filter_map(|b| {
            let range = b.range();
            range.overlaps(requested).then(|| Conflict {
                booking: b.clone(),
                overlap_minutes: range.overlap_minutes(requested),
            })
        })
        .collect()
}

/// Merge the active bookings into sorted, non-overlapping busy periods clipped
/// to `window`. Touching periods are merged into one; zero-length bookings are dropped.
pub fn merge_busy_periods(bookings: &[Booking], window: &TimeRange) -> Vec<TimeRange> {
    // Clip to the window, discarding bookings entirely outside it.
    let mut intervals: Vec<TimeRange> = bookings
        .iter()
        .filter(|b| b.is_active())
        .map(Booking::range)
        .filter(|r| r.overlaps(window))
        .map(|r| TimeRange::new(r.start.max(window.start), r.end.min(window.end)))
        .filter(|r| !r.is_empty())
        .collect();

    if intervals.is_empty() {
        return Vec::new();
    }

    intervals.sort();

    let mut merged: Vec<TimeRange> = Vec::with_capacity(intervals.len());
    for range in intervals {
        if let Some(last) = merged.last_mut() {
            if range.start <= last.end {
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }

    merged
}

/// Does `range` overlap any of the sorted, disjoint `busy` periods?
///
/// Binary search on the first period ending after `range.start`; only that
/// period can be the earliest overlap.
pub fn overlaps_any(range: &TimeRange, busy: &[TimeRange]) -> bool {
    let idx = busy.partition_point(|b| b.end <= range.start);
    busy.get(idx).is_some_and(|b| b.overlaps(range))
}
