//! Status text rendering.

use chrono::{Datelike, Duration, NaiveDate};

use crate::interval::Interval;

/// Render the timeline followed by the meeting parenthetical.
///
/// `"08:00 - 10:00, 11:00 - 16:00 (:calendar: 10:00 - 11:00)"`, or just the
/// timeline when there are no meetings.
pub fn render(timeline: &[Interval], meetings: &[Interval], meeting_emoji: &str) -> String {
    let mut status = join(timeline);
    if !meetings.is_empty() {
        status.push_str(&format!(" ({} {})", meeting_emoji, join(meetings)));
    }
    status
}

/// `"On vacation. Will be back on M/D"`, where the date is the day after the
/// last vacation day.
pub fn vacation_message(until: NaiveDate) -> String {
    let back = until + Duration::days(1);
    format!("On vacation. Will be back on {}/{}", back.month(), back.day())
}

/// Comma-and-space separated `HH:MM - HH:MM` list.
pub(crate) fn join(intervals: &[Interval]) -> String {
    intervals
        .iter()
        .map(Interval::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
