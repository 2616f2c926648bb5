//! Validation of `HH:MM` answers against the available windows.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use thiserror::Error;

use crate::render::join;
use crate::windows::WindowSet;

static HOUR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[0-9]|1[0-9]|2[0-3]):([0-5][0-9])$").expect("hour pattern is valid")
});

/// Why an answer to a time prompt was refused. The `Display` text is what the
/// user sees before being asked again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid input, please set: hh:mm")]
    Format,

    #[error("Time must be between one of these windows: {0}")]
    OutsideWindows(String),

    #[error("Time must be after {after} and before {before}")]
    OutsideStartWindow { after: String, before: String },

    #[error("Time must be after {0}")]
    TooEarly(String),
}

/// What a time prompt accepts.
#[derive(Debug, Clone, Copy)]
pub enum TimeConstraint<'a> {
    /// Any well-formed time.
    Anywhere,
    /// Strictly after the given time; used for the end of the status range.
    LaterThan(NaiveDateTime),
    /// A time inside one of the windows (inclusive).
    Within(&'a WindowSet),
    /// An end time: inside the window that contains `start`, and `>= start`.
    After {
        start: NaiveDateTime,
        windows: &'a WindowSet,
    },
}

impl TimeConstraint<'_> {
    /// Parse `answer` as `HH:MM` on `today` and check it against the constraint.
    pub fn accept(&self, answer: &str, today: NaiveDate) -> Result<NaiveDateTime, InputError> {
        let time = today.and_time(parse_hour(answer)?);
        self.check(time)?;
        Ok(time)
    }

    fn check(&self, time: NaiveDateTime) -> Result<(), InputError> {
        match *self {
            TimeConstraint::Anywhere => Ok(()),
            TimeConstraint::LaterThan(start) => {
                if time > start {
                    Ok(())
                } else {
                    Err(InputError::TooEarly(hh_mm(start)))
                }
            }
            TimeConstraint::Within(windows) => {
                if windows.containing(time).is_some() {
                    Ok(())
                } else {
                    Err(InputError::OutsideWindows(join(windows.windows())))
                }
            }
            TimeConstraint::After { start, windows } => match windows.containing(start) {
                Some(window) if time >= start && time <= window.end() => Ok(()),
                Some(window) => Err(InputError::OutsideStartWindow {
                    after: hh_mm(start),
                    before: hh_mm(window.end()),
                }),
                None => Err(InputError::OutsideWindows(join(windows.windows()))),
            },
        }
    }
}

/// Parse a strict 24-hour `HH:MM` string.
pub fn parse_hour(input: &str) -> Result<NaiveTime, InputError> {
    let caps = HOUR_PATTERN.captures(input).ok_or(InputError::Format)?;
    let hour: u32 = caps[1].parse().map_err(|_| InputError::Format)?;
    let minute: u32 = caps[2].parse().map_err(|_| InputError::Format)?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(InputError::Format)
}

fn hh_mm(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

