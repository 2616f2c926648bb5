//! The `(start, end)` value every other structure is built from.

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{Result, StatusError};

/// A span of wall-clock time, `start <= end`.
///
/// Ordering is by `start` first, then `end`, so sorting a list of intervals
/// sorts it by start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Interval {
    /// Build an interval, rejecting `start > end`.
    ///
    /// Zero-width intervals are representable; the structures that store
    /// intervals decide to drop them.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(StatusError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Construct from bounds the caller has already ordered.
    pub(crate) fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start <= end, "interval bounds out of order");
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive on both ends.
    pub fn contains(&self, point: NaiveDateTime) -> bool {
        self.start <= point && point <= self.end
    }

    /// Whether the two intervals share a non-empty span.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// `HH:MM - HH:MM`, 24-hour and zero-padded.
impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}
