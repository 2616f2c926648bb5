//! Error types for daystatus-core operations.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Invalid interval: start {start} is after end {end}")]
    InvertedInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("No available window contains {0}")]
    OutsideWindows(NaiveDateTime),

    #[error("Claim ending at {claim_end} overruns the window ending at {window_end}")]
    ClaimOverrunsWindow {
        claim_end: NaiveDateTime,
        window_end: NaiveDateTime,
    },

    #[error("No status range left today: it would start and end at {0}")]
    EmptyStatusRange(NaiveDateTime),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time {0} does not exist in the configured timezone")]
    NonexistentLocalTime(NaiveDateTime),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StatusError>;
