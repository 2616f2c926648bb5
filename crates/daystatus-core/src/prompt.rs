//! The interactive dialogue the orchestrator drives.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::input::TimeConstraint;

/// A question-and-answer channel with the user.
///
/// Implementations keep asking until the answer is acceptable; an `Err` means
/// the channel itself failed (e.g. input closed).
pub trait Prompt {
    fn ask_yes_no(&mut self, question: &str) -> Result<bool>;

    /// A non-empty line of text.
    fn ask_text(&mut self, question: &str) -> Result<String>;

    /// A time on `today` that satisfies `constraint`. Use
    /// [`TimeConstraint::accept`] to validate answers and its error text to
    /// explain refusals.
    fn ask_time(
        &mut self,
        question: &str,
        constraint: &TimeConstraint<'_>,
        today: NaiveDate,
    ) -> Result<NaiveDateTime>;

    /// Print an informational line.
    fn show(&mut self, line: &str);
}
