//! The zone "now", "today" and status expiry are computed in.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, StatusError};

/// Either the machine's local zone or a configured IANA zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalZone {
    #[default]
    System,
    Named(Tz),
}

impl LocalZone {
    /// Parse an IANA zone name such as `"Europe/Amsterdam"`.
    pub fn parse(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| StatusError::InvalidTimezone(name.to_string()))?;
        Ok(LocalZone::Named(tz))
    }

    /// Current wall-clock time in this zone.
    pub fn now(&self) -> NaiveDateTime {
        self.wall_clock(Utc::now())
    }

    /// Convert an instant to wall-clock time in this zone.
    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            LocalZone::System => instant.with_timezone(&Local).naive_local(),
            LocalZone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Seconds since the Unix epoch for a wall-clock time in this zone.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant.
    ///
    /// # Errors
    /// Returns `StatusError::NonexistentLocalTime` for times inside a DST gap.
    pub fn epoch_seconds(&self, at: NaiveDateTime) -> Result<i64> {
        let seconds = match self {
            LocalZone::System => Local.from_local_datetime(&at).earliest().map(|d| d.timestamp()),
            LocalZone::Named(tz) => tz.from_local_datetime(&at).earliest().map(|d| d.timestamp()),
        };
        seconds.ok_or(StatusError::NonexistentLocalTime(at))
    }

    /// Epoch seconds of 23:59:59 on `date`.
    pub fn end_of_day(&self, date: NaiveDate) -> Result<i64> {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or(StatusError::NonexistentLocalTime(date.and_time(NaiveTime::MIN)))?;
        self.epoch_seconds(date.and_time(last_second))
    }
}
