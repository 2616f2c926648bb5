//! One status period: the bounding range, both interval sets and the meetings.
//!
//! [`Schedule`] is the only place that decides which set a claim goes to:
//! meetings carve the [`WindowSet`], breaks carve the [`WindowSet`] and the
//! [`Timeline`].

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

use crate::error::Result;
use crate::interval::Interval;
use crate::meetings::MeetingList;
use crate::render::render;
use crate::windows::{Timeline, WindowSet};

const QUARTER_HOUR_SECS: i64 = 15 * 60;
const AUTO_RANGE_MINUTES: i64 = 8 * 60 + 30;
const LAST_MINUTE_OF_DAY: i64 = 23 * 60 + 59;

/// What happened to a meeting or break handed to the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claimed {
    Added,
    /// Zero-width claims are not stored.
    DroppedEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    bounds: Interval,
    windows: WindowSet,
    timeline: Timeline,
    meetings: MeetingList,
}

impl Schedule {
    pub fn new(bounds: Interval) -> Self {
        Self {
            bounds,
            windows: WindowSet::seeded(bounds),
            timeline: Timeline::seeded(bounds),
            meetings: MeetingList::new(),
        }
    }

    pub fn bounds(&self) -> Interval {
        self.bounds
    }

    pub fn windows(&self) -> &WindowSet {
        &self.windows
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn meetings(&self) -> &MeetingList {
        &self.meetings
    }

    /// List a meeting and carve it out of the available windows only.
    pub fn add_meeting(&mut self, meeting: Interval) -> Result<Claimed> {
        if meeting.is_degenerate() {
            return Ok(Claimed::DroppedEmpty);
        }
        self.windows.carve(&meeting)?;
        self.meetings.insert(meeting);
        Ok(Claimed::Added)
    }

    /// Carve a break out of both the available windows and the timeline.
    pub fn add_break(&mut self, brk: Interval) -> Result<Claimed> {
        if brk.is_degenerate() {
            return Ok(Claimed::DroppedEmpty);
        }
        // Timeline windows are supersets of the available windows, so a break
        // that fits the latter fits the former.
        let mut windows = self.windows.clone();
        windows.carve(&brk)?;
        self.timeline.carve_break(&brk)?;
        self.windows = windows;
        Ok(Claimed::Added)
    }

    /// Add meetings fetched from calendar integrations.
    ///
    /// Exact duplicates across sources collapse into one; meetings outside the
    /// bounding range and zero-width meetings are dropped. Imported meetings are
    /// clipped out of the windows rather than validated against them. Returns
    /// how many meetings were kept.
    pub fn import_meetings(&mut self, imported: impl IntoIterator<Item = Interval>) -> usize {
        let bounds = self.bounds;
        let kept: Vec<Interval> = imported
            .into_iter()
            .filter(|m| {
                let keep = !m.is_degenerate() && m.overlaps(&bounds);
                if !keep {
                    debug!(meeting = %m, "imported meeting outside the status range");
                }
                keep
            })
            .collect();

        for meeting in &kept {
            self.windows.subtract(meeting);
        }
        let before = self.meetings.len();
        self.meetings.extend_deduped(kept);
        self.meetings.len() - before
    }

    /// The status text as it currently stands.
    pub fn status_text(&self, meeting_emoji: &str) -> String {
        render(
            self.timeline.windows(),
            self.meetings.as_slice(),
            meeting_emoji,
        )
    }
}

/// Bounding range computed from the current time.
///
/// Starts at the first quarter-hour mark at or after `now` and lasts 8h30m.
/// Both ends are clamped to 23:59 of the same day.
pub fn auto_bounds(now: NaiveDateTime) -> Interval {
    let day_start = now.date().and_time(NaiveTime::MIN);
    let latest = day_start + Duration::minutes(LAST_MINUTE_OF_DAY);

    let elapsed = (now - day_start).num_seconds();
    let on_mark = elapsed % QUARTER_HOUR_SECS == 0 && now.nanosecond() == 0;
    let rounded = if on_mark {
        elapsed
    } else {
        (elapsed / QUARTER_HOUR_SECS + 1) * QUARTER_HOUR_SECS
    };

    let start = (day_start + Duration::seconds(rounded)).min(latest);
    let end = (start + Duration::minutes(AUTO_RANGE_MINUTES)).min(latest);
    Interval::between(start, end)
}
