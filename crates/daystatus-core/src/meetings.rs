//! Meetings listed in the status parenthetical.

use crate::interval::Interval;

/// Meetings kept sorted by start time.
///
/// Overlapping meetings are kept as they are. The only deduplication is
/// [`extend_deduped`](Self::extend_deduped), used when merging calendar
/// imports from several integrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingList {
    meetings: Vec<Interval>,
}

impl MeetingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.meetings
    }

    pub fn len(&self) -> usize {
        self.meetings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }

    /// Insert a meeting, keeping the list sorted. Duplicates are allowed.
    pub fn insert(&mut self, meeting: Interval) {
        let at = self.meetings.partition_point(|m| m <= &meeting);
        self.meetings.insert(at, meeting);
    }

    /// Add meetings from several sources, dropping exact duplicates among them.
    pub fn extend_deduped(&mut self, imported: impl IntoIterator<Item = Interval>) {
        let mut imported: Vec<Interval> = imported.into_iter().collect();
        imported.sort();
        imported.dedup();
        for meeting in imported {
            self.insert(meeting);
        }
    }
}
