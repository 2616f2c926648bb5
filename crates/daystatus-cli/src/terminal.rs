//! Line-based [`Prompt`] over any reader/writer pair (stdin/stdout in the binary).

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use chrono::{NaiveDate, NaiveDateTime};
use daystatus_core::error::Result;
use daystatus_core::{Prompt, StatusError, TimeConstraint};

pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(StatusError::Prompt("input closed".into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        self.say(&format!("{question} (y/n)"))?;
        loop {
            match self.read_line()?.as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => self.say("Invalid input, please choose: y/n")?,
            }
        }
    }

    fn ask_text(&mut self, question: &str) -> Result<String> {
        self.say(question)?;
        loop {
            let line = self.read_line()?;
            if !line.is_empty() {
                return Ok(line);
            }
            self.say("Invalid input, please add text")?;
        }
    }

    fn ask_time(
        &mut self,
        question: &str,
        constraint: &TimeConstraint<'_>,
        today: NaiveDate,
    ) -> Result<NaiveDateTime> {
        self.say(&format!("{question} (hh:mm)"))?;
        loop {
            let line = self.read_line()?;
            match constraint.accept(&line, today) {
                Ok(time) => return Ok(time),
                Err(refusal) => self.say(&refusal.to_string())?,
            }
        }
    }

    fn show(&mut self, line: &str) {
        // A broken stdout surfaces on the next question.
        let _ = self.say(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daystatus_core::{Interval, WindowSet};
    use std::io::Cursor;

    fn prompt(input: &str) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        today().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn yes_no_reprompts_until_y_or_n() {
        let mut p = prompt("yes\nY\nn\n");
        assert!(!p.ask_yes_no("Continue?").unwrap());

        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.starts_with("Continue? (y/n)\n"));
        assert_eq!(out.matches("Invalid input, please choose: y/n").count(), 2);
    }

    #[test]
    fn text_rejects_empty_lines() {
        let mut p = prompt("\nIn the office\n");
        assert_eq!(p.ask_text("Status?").unwrap(), "In the office");

        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Invalid input, please add text"));
    }

    #[test]
    fn time_reprompts_on_format_and_window_errors() {
        let windows = WindowSet::seeded(Interval::new(at(8, 0), at(16, 0)).unwrap());
        let mut p = prompt("9:00\n17:00\n09:30\n");

        let time = p
            .ask_time("Start?", &TimeConstraint::Within(&windows), today())
            .unwrap();
        assert_eq!(time, at(9, 30));

        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Start? (hh:mm)"));
        assert!(out.contains("Invalid input, please set: hh:mm"));
        assert!(out.contains("Time must be between one of these windows: 08:00 - 16:00"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = prompt("");
        assert!(matches!(
            p.ask_yes_no("Continue?"),
            Err(StatusError::Prompt(_))
        ));
    }
}
