//! Provider event records → meeting intervals for today.
//!
//! Both supported providers describe an event with nested `start`/`end`
//! objects carrying either a `dateTime` (timed events) or a `date` (all-day
//! events). They differ in how the timestamp is written:
//!
//! - Google Calendar writes local wall-clock time with an offset suffix
//!   (`2026-03-16T10:00:00+01:00`). The suffix is dropped and the wall-clock
//!   part is used as is.
//! - Microsoft Graph writes UTC with fractional seconds
//!   (`2026-03-16T09:00:00.0000000`). The fraction is dropped and the instant is
//!   converted to the local zone.
//!
//! Either way the result is naive local time, and only events *starting* today
//! are kept.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::LocalZone;
use crate::interval::Interval;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The closed set of calendar providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "google-calendar")]
    GoogleCalendar,
    #[serde(rename = "azure-teams")]
    AzureTeams,
}

impl SourceKind {
    /// The configuration key naming this provider.
    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::GoogleCalendar => "google-calendar",
            SourceKind::AzureTeams => "azure-teams",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A provider-native event, reduced to the fields normalization reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub start: RawEventTime,
    #[serde(default)]
    pub end: RawEventTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl RawEventTime {
    /// The date-time when present, otherwise the all-day date.
    fn value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// Convert raw events into intervals for the events that start on `today`.
///
/// Events with unreadable timestamps or with an end before their start are
/// skipped with a warning. The result is in input order; sorting and
/// deduplication across providers is the caller's job.
pub fn normalize(
    raw: &[RawEvent],
    kind: SourceKind,
    zone: &LocalZone,
    today: NaiveDate,
) -> Vec<Interval> {
    raw.iter()
        .filter_map(|event| match to_interval(event, kind, zone) {
            Ok(interval) => Some(interval),
            Err(reason) => {
                warn!(source = %kind, %reason, "skipping calendar event");
                None
            }
        })
        .filter(|interval| interval.start().date() == today)
        .collect()
}

fn to_interval(event: &RawEvent, kind: SourceKind, zone: &LocalZone) -> Result<Interval, String> {
    let start = parse_time(&event.start, kind, zone)?;
    let end = parse_time(&event.end, kind, zone)?;
    Interval::new(start, end).map_err(|e| e.to_string())
}

fn parse_time(
    time: &RawEventTime,
    kind: SourceKind,
    zone: &LocalZone,
) -> Result<NaiveDateTime, String> {
    let value = time
        .value()
        .ok_or_else(|| "event time has neither dateTime nor date".to_string())?;

    let parsed = match kind {
        SourceKind::GoogleCalendar => parse_offset_stripped(value),
        SourceKind::AzureTeams => parse_utc(value, zone),
    };
    parsed.ok_or_else(|| format!("unreadable timestamp {value:?}"))
}

/// Wall-clock part of an offset timestamp, or midnight of a bare date.
fn parse_offset_stripped(value: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .ok()
        .or_else(|| parse_date(value))
}

/// A UTC timestamp with optional fractional seconds or `Z`, moved into `zone`.
fn parse_utc(value: &str, zone: &LocalZone) -> Option<NaiveDateTime> {
    let trimmed = value.trim_end_matches('Z');
    let whole_seconds = trimmed.split('.').next().unwrap_or(trimmed);
    match NaiveDateTime::parse_from_str(whole_seconds, DATE_TIME_FORMAT) {
        Ok(naive) => Some(zone.wall_clock(Utc.from_utc_datetime(&naive))),
        Err(_) => parse_date(value),
    }
}

fn parse_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}
