//! Sorted, non-overlapping interval sets and the carve operation.
//!
//! A [`WindowSet`] holds the time that is still free to claim. Claiming a span
//! (a meeting or a break) splits the window containing it into at most two
//! remainders. A [`Timeline`] has the same shape but is only ever carved by
//! breaks; it is what gets printed before the meeting list.

use crate::error::{Result, StatusError};
use crate::interval::Interval;
use chrono::NaiveDateTime;

/// Ordered windows of available time.
///
/// Invariant: sorted by start, `windows[i].end <= windows[i + 1].start`, and no
/// window has zero width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSet {
    windows: Vec<Interval>,
}

impl WindowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding only the bounding range (or nothing, if it has zero width).
    pub fn seeded(bounds: Interval) -> Self {
        let mut set = Self {
            windows: vec![bounds],
        };
        set.drop_degenerate();
        set
    }

    pub fn windows(&self) -> &[Interval] {
        &self.windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// The first window, in ascending order, that contains `point` (inclusive).
    ///
    /// A point sitting on the boundary of two adjacent windows belongs to the
    /// earlier one.
    pub fn containing(&self, point: NaiveDateTime) -> Option<&Interval> {
        self.position_containing(point).map(|i| &self.windows[i])
    }

    fn position_containing(&self, point: NaiveDateTime) -> Option<usize> {
        self.windows.iter().position(|w| w.contains(point))
    }

    /// Remove `claim` from the window that contains its start.
    ///
    /// Only that one window is examined: the claim must end at or before the
    /// window's end. The containing window `w` is replaced by
    /// `(w.start, claim.start)` and `(claim.end, w.end)`, and zero-width
    /// remainders are dropped. A zero-width claim changes nothing.
    ///
    /// # Errors
    /// Returns `StatusError::OutsideWindows` if no window contains the claim's
    /// start, and `StatusError::ClaimOverrunsWindow` if the claim ends after the
    /// containing window. The set is left untouched on error.
    pub fn carve(&mut self, claim: &Interval) -> Result<()> {
        if claim.is_degenerate() {
            return Ok(());
        }

        let index = self
            .position_containing(claim.start())
            .ok_or(StatusError::OutsideWindows(claim.start()))?;
        let window = self.windows[index];

        if claim.end() > window.end() {
            return Err(StatusError::ClaimOverrunsWindow {
                claim_end: claim.end(),
                window_end: window.end(),
            });
        }

        self.windows[index] = Interval::between(window.start(), claim.start());
        self.windows
            .insert(index + 1, Interval::between(claim.end(), window.end()));
        self.drop_degenerate();
        Ok(())
    }

    /// Remove every part of `claim` that overlaps any window.
    ///
    /// Unlike [`carve`](Self::carve) the claim may start outside the windows or
    /// span several of them; whatever overlaps is clipped away. Used for
    /// meetings imported from calendars, which are not validated against the
    /// windows beforehand.
    pub fn subtract(&mut self, claim: &Interval) {
        if claim.is_degenerate() {
            return;
        }

        let mut remaining = Vec::with_capacity(self.windows.len() + 1);
        for window in &self.windows {
            if !window.overlaps(claim) {
                remaining.push(*window);
                continue;
            }
            if window.start() < claim.start() {
                remaining.push(Interval::between(window.start(), claim.start()));
            }
            if claim.end() < window.end() {
                remaining.push(Interval::between(claim.end(), window.end()));
            }
        }
        self.windows = remaining;
    }

    fn drop_degenerate(&mut self) {
        self.windows.retain(|w| !w.is_degenerate());
    }
}

/// The printed part of the status: the bounding range minus breaks.
///
/// Wraps a [`WindowSet`] so that only breaks can be carved from it; meetings
/// never reach this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    inner: WindowSet,
}

impl Timeline {
    pub fn seeded(bounds: Interval) -> Self {
        Self {
            inner: WindowSet::seeded(bounds),
        }
    }

    pub fn windows(&self) -> &[Interval] {
        self.inner.windows()
    }

    /// Carve a break out of the timeline. Same semantics as [`WindowSet::carve`].
    pub fn carve_break(&mut self, brk: &Interval) -> Result<()> {
        self.inner.carve(brk)
    }
}
