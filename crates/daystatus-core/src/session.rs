//! The orchestrator: one run from mode selection to publishing.
//!
//! ```text
//! ChoosingMode ──► Vacation ─────────────┐
//!              ├─► FullyManual ──────────┼──► Publishing ──► Done
//!              └─► PartiallyAutomatic ───┘
//! ```
//!
//! An active vacation skips every question. Otherwise the user picks a free
//! text status, or a schedule built from a bounding range, calendar meetings,
//! manual meetings and breaks.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::calendar::{collect_meetings, CalendarProvider};
use crate::config::{Config, Vacation};
use crate::error::{Result, StatusError};
use crate::input::TimeConstraint;
use crate::interval::Interval;
use crate::prompt::Prompt;
use crate::publish::{publish_all, AccountReport, PresencePublisher, PublishStep, StatusUpdate};
use crate::render::vacation_message;
use crate::schedule::{auto_bounds, Claimed, Schedule};

const NO_TIME_LEFT: &str = "No available time left in the status range.";
const MISSING_ERROR: &str = "Error not present in slack response!";

/// How the status is being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Vacation(Vacation),
    FullyManual,
    PartiallyAutomatic(BoundsSource),
}

/// Where the bounding range of a partially automatic status comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsSource {
    /// Next quarter hour through 8h30m later.
    Automatic,
    /// Asked from the user.
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimKind {
    Meeting,
    Break,
}

impl ClaimKind {
    fn noun(self) -> &'static str {
        match self {
            ClaimKind::Meeting => "meeting",
            ClaimKind::Break => "break",
        }
    }
}

/// Per-run settings resolved from configuration; vacation overrides the emoji
/// and expiration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub status_emoji: String,
    pub meeting_emoji: String,
    /// Seconds since the Unix epoch; end of today unless on vacation.
    pub expiration: i64,
    pub silent_output: bool,
}

pub struct Session<'c> {
    config: &'c Config,
    now: NaiveDateTime,
    state: SessionState,
}

impl<'c> Session<'c> {
    /// Start a run at wall-clock time `now` (in the configured zone).
    pub fn new(config: &'c Config, now: NaiveDateTime) -> Result<Self> {
        let state = SessionState {
            status_emoji: config.status_emoji.clone(),
            meeting_emoji: config.meeting_emoji.clone(),
            expiration: config.zone.end_of_day(now.date())?,
            silent_output: config.silent_output,
        };
        Ok(Self { config, now, state })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// The vacation, if its last day is strictly after today.
    pub fn active_vacation(&self) -> Option<&Vacation> {
        self.config
            .vacation
            .as_ref()
            .filter(|v| v.until > self.today())
    }

    /// Decide the mode, asking the user unless a vacation is active.
    pub fn choose_mode(&self, prompt: &mut dyn Prompt) -> Result<Mode> {
        if let Some(vacation) = self.active_vacation() {
            return Ok(Mode::Vacation(vacation.clone()));
        }
        if !prompt.ask_yes_no("Do you want to set the status manually?")? {
            return Ok(Mode::PartiallyAutomatic(BoundsSource::Automatic));
        }
        if prompt.ask_yes_no("Do you want to set the status FULLY manually with a free text?")? {
            Ok(Mode::FullyManual)
        } else {
            Ok(Mode::PartiallyAutomatic(BoundsSource::Interactive))
        }
    }

    /// Run the dialogue and produce the status to publish.
    pub fn compose(
        &mut self,
        prompt: &mut dyn Prompt,
        providers: &mut [Box<dyn CalendarProvider>],
    ) -> Result<StatusUpdate> {
        let mode = self.choose_mode(prompt)?;
        debug!(?mode, "status mode chosen");

        let text = match mode {
            Mode::Vacation(vacation) => {
                self.state.expiration = self.config.zone.end_of_day(vacation.until)?;
                self.state.status_emoji = vacation.emoji;
                vacation_message(vacation.until)
            }
            Mode::FullyManual => {
                prompt.ask_text("Add the fix status message you want to set:")?
            }
            Mode::PartiallyAutomatic(source) => {
                let schedule = self.compose_schedule(prompt, providers, source)?;
                schedule.status_text(&self.state.meeting_emoji)
            }
        };

        Ok(StatusUpdate {
            text,
            emoji: self.state.status_emoji.clone(),
            expiration: self.state.expiration,
        })
    }

    /// Bounding range, calendar meetings, then manual meetings and breaks.
    pub fn compose_schedule(
        &self,
        prompt: &mut dyn Prompt,
        providers: &mut [Box<dyn CalendarProvider>],
        source: BoundsSource,
    ) -> Result<Schedule> {
        let bounds = match source {
            BoundsSource::Automatic => auto_bounds(self.now),
            BoundsSource::Interactive => self.ask_bounds(prompt)?,
        };
        if bounds.is_degenerate() {
            return Err(StatusError::EmptyStatusRange(bounds.start()));
        }
        let mut schedule = Schedule::new(bounds);

        if !providers.is_empty() {
            let imported = collect_meetings(providers, &self.config.zone, self.today());
            let kept = schedule.import_meetings(imported);
            prompt.show(&format!(
                "Imported {kept} meeting(s) from calendar integrations."
            ));
        }

        self.claim_loop(prompt, &mut schedule, ClaimKind::Meeting)?;
        self.claim_loop(prompt, &mut schedule, ClaimKind::Break)?;
        Ok(schedule)
    }

    fn ask_bounds(&self, prompt: &mut dyn Prompt) -> Result<Interval> {
        let today = self.today();
        let start = prompt.ask_time(
            "Set the starting time of the status",
            &TimeConstraint::Anywhere,
            today,
        )?;
        let end = prompt.ask_time(
            "Set the ending time of the status",
            &TimeConstraint::LaterThan(start),
            today,
        )?;
        Interval::new(start, end)
    }

    /// Offer meetings (or breaks) until the user declines or no time is left.
    fn claim_loop(
        &self,
        prompt: &mut dyn Prompt,
        schedule: &mut Schedule,
        kind: ClaimKind,
    ) -> Result<()> {
        let today = self.today();
        let noun = kind.noun();
        let mut first_added = false;

        loop {
            if schedule.windows().is_empty() {
                prompt.show(NO_TIME_LEFT);
                return Ok(());
            }

            let first = match kind {
                ClaimKind::Meeting => schedule.meetings().is_empty(),
                ClaimKind::Break => !first_added,
            };
            let question = format!(
                "Would you like to add {} {}? Current status is: {}.",
                if first { "a" } else { "another" },
                noun,
                schedule.status_text(&self.state.meeting_emoji)
            );
            if !prompt.ask_yes_no(&question)? {
                return Ok(());
            }

            let start = prompt.ask_time(
                &format!("Set the starting time of the {noun}"),
                &TimeConstraint::Within(schedule.windows()),
                today,
            )?;
            let end = prompt.ask_time(
                &format!("Set the ending time of the {noun}"),
                &TimeConstraint::After {
                    start,
                    windows: schedule.windows(),
                },
                today,
            )?;

            let claim = Interval::new(start, end)?;
            let claimed = match kind {
                ClaimKind::Meeting => schedule.add_meeting(claim)?,
                ClaimKind::Break => schedule.add_break(claim)?,
            };
            match claimed {
                Claimed::Added => first_added = true,
                Claimed::DroppedEmpty => prompt.show(&format!("Zero-length {noun} ignored.")),
            }
        }
    }

    /// Show the final status and publish it to every configured account.
    pub fn publish(
        &self,
        update: &StatusUpdate,
        publisher: &dyn PresencePublisher,
        prompt: &mut dyn Prompt,
    ) -> Vec<AccountReport> {
        prompt.show("");
        prompt.show("The final status message will be:");
        prompt.show(&update.text);
        prompt.show("");

        let silent = self.state.silent_output;
        publish_all(publisher, &self.config.accounts, update, |step| match step {
            PublishStep::Starting { index } => {
                prompt.show(&format!("Configuring the {}. workspace...", index + 1));
            }
            PublishStep::Finished(report) => {
                if !silent {
                    if let Some(raw) = &report.outcome.raw {
                        prompt.show("Slack response:");
                        prompt.show(&raw.to_string());
                    }
                }
                if report.outcome.ok {
                    prompt.show("Done");
                } else {
                    prompt.show(&format!(
                        "Error on setting slack status: {}",
                        report.outcome.error.as_deref().unwrap_or(MISSING_ERROR)
                    ));
                }
            }
        })
    }
}
