//! # daystatus-core
//!
//! Composes a human-readable availability status ("08:00 - 12:00, 13:00 - 16:30
//! (:calendar: 10:00 - 11:00)") from a bounding time range, meetings and breaks.
//!
//! Two interval sets are tracked side by side: the [`WindowSet`] of time that is
//! still free to claim, carved by both meetings and breaks, and the [`Timeline`]
//! that ends up printed, carved by breaks only. Meetings are listed separately.
//!
//! ## Modules
//!
//! - [`interval`] — the `(start, end)` value type
//! - [`windows`] — [`WindowSet`] and [`Timeline`] with the carve operation
//! - [`meetings`] — sorted [`MeetingList`]
//! - [`schedule`] — routes meetings and breaks into the right sets, bounding ranges
//! - [`input`] — `HH:MM` parsing and window-constrained validation
//! - [`normalize`] — provider event records → intervals for today
//! - [`render`] — status text rendering
//! - [`config`] — validated configuration
//! - [`clock`] — local zone, "now" and epoch conversion
//! - [`calendar`], [`publish`], [`prompt`] — collaborator interfaces
//! - [`session`] — the orchestrator driving one run
//! - [`error`] — Error types

pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod interval;
pub mod meetings;
pub mod normalize;
pub mod prompt;
pub mod publish;
pub mod render;
pub mod schedule;
pub mod session;
pub mod windows;

pub use calendar::{collect_meetings, fetch_with_reauth, CalendarProvider, FetchError};
pub use clock::LocalZone;
pub use config::{Account, Config, IntegrationConfig, Vacation};
pub use error::StatusError;
pub use input::{parse_hour, InputError, TimeConstraint};
pub use interval::Interval;
pub use meetings::MeetingList;
pub use normalize::{normalize, RawEvent, RawEventTime, SourceKind};
pub use prompt::Prompt;
pub use publish::{
    publish_all, AccountReport, PresencePublisher, PublishOutcome, PublishStep, StatusUpdate,
};
pub use render::{render, vacation_message};
pub use schedule::{auto_bounds, Claimed, Schedule};
pub use session::{BoundsSource, Mode, Session, SessionState};
pub use windows::{Timeline, WindowSet};
