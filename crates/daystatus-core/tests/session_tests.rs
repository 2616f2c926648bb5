//! Orchestrator tests driven by scripted collaborators.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use daystatus_core::calendar::collect_meetings;
use daystatus_core::error::Result;
use daystatus_core::{
    Account, BoundsSource, CalendarProvider, Config, FetchError, Interval, LocalZone, Mode,
    PresencePublisher, Prompt, PublishOutcome, RawEvent, Session, SourceKind, StatusError,
    StatusUpdate, TimeConstraint,
};
use serde_json::json;

// ── Fakes ───────────────────────────────────────────────────────────────────

/// Shared between a prompt and a publisher to check interleaving.
type EventLog = Rc<RefCell<Vec<String>>>;

/// Answers questions from a fixed script and records everything it is told.
#[derive(Default)]
struct ScriptedPrompt {
    answers: VecDeque<String>,
    transcript: Vec<String>,
    log: EventLog,
}

impl ScriptedPrompt {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    fn next(&mut self) -> Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| StatusError::Prompt("script exhausted".into()))
    }

    fn said(&self, line: &str) -> bool {
        self.transcript.iter().any(|l| l == line)
    }
}

impl Prompt for ScriptedPrompt {
    fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        self.transcript.push(question.to_string());
        Ok(self.next()? == "y")
    }

    fn ask_text(&mut self, question: &str) -> Result<String> {
        self.transcript.push(question.to_string());
        self.next()
    }

    fn ask_time(
        &mut self,
        question: &str,
        constraint: &TimeConstraint<'_>,
        today: NaiveDate,
    ) -> Result<NaiveDateTime> {
        self.transcript.push(question.to_string());
        loop {
            let answer = self.next()?;
            match constraint.accept(&answer, today) {
                Ok(time) => return Ok(time),
                Err(refusal) => self.transcript.push(refusal.to_string()),
            }
        }
    }

    fn show(&mut self, line: &str) {
        self.log.borrow_mut().push(line.to_string());
        self.transcript.push(line.to_string());
    }
}

/// Replays queued fetch results, then serves its events.
struct StaticProvider {
    kind: SourceKind,
    instance: usize,
    events: Vec<RawEvent>,
    failures: VecDeque<FetchError>,
    fetches: Rc<Cell<usize>>,
    reauths: Rc<Cell<usize>>,
}

impl StaticProvider {
    fn new(kind: SourceKind, events: Vec<RawEvent>) -> Self {
        Self {
            kind,
            instance: 0,
            events,
            failures: VecDeque::new(),
            fetches: Rc::new(Cell::new(0)),
            reauths: Rc::new(Cell::new(0)),
        }
    }

    fn failing_with(mut self, failures: Vec<FetchError>) -> Self {
        self.failures = failures.into();
        self
    }
}

impl CalendarProvider for StaticProvider {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn instance(&self) -> usize {
        self.instance
    }

    fn fetch_raw_events(&mut self) -> std::result::Result<Vec<RawEvent>, FetchError> {
        self.fetches.set(self.fetches.get() + 1);
        match self.failures.pop_front() {
            Some(failure) => Err(failure),
            None => Ok(self.events.clone()),
        }
    }

    fn reauthenticate(&mut self) -> std::result::Result<(), FetchError> {
        self.reauths.set(self.reauths.get() + 1);
        Ok(())
    }
}

/// Succeeds for every user id except those given a canned failure.
#[derive(Default)]
struct RecordingPublisher {
    failures: HashMap<String, String>,
    calls: RefCell<Vec<(String, StatusUpdate)>>,
    log: EventLog,
}

impl PresencePublisher for RecordingPublisher {
    fn publish(&self, update: &StatusUpdate, account: &Account) -> PublishOutcome {
        self.log
            .borrow_mut()
            .push(format!("publish {}", account.user_id));
        self.calls
            .borrow_mut()
            .push((account.user_id.clone(), update.clone()));
        match self.failures.get(&account.user_id) {
            Some(error) => PublishOutcome {
                ok: false,
                error: Some(error.clone()),
                raw: Some(json!({ "ok": false, "error": error })),
            },
            None => PublishOutcome {
                ok: true,
                error: None,
                raw: Some(json!({ "ok": true })),
            },
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    today().and_hms_opt(h, m, 0).unwrap()
}

fn iv(sh: u32, sm: u32, eh: u32, em: u32) -> Interval {
    Interval::new(at(sh, sm), at(eh, em)).unwrap()
}

fn config(extra: serde_json::Value) -> Config {
    let mut base = json!({
        "slackApiTokens": ["t1", "t2", "t3"],
        "slackUserIds": ["U1", "U2", "U3"],
        "localTimeZone": "UTC"
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    Config::from_json(&base.to_string()).unwrap()
}

fn end_of_day_utc(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_hms_opt(23, 59, 59).unwrap())
        .timestamp()
}

fn google_event(start: &str, end: &str) -> RawEvent {
    serde_json::from_value(json!({
        "start": { "dateTime": start },
        "end": { "dateTime": end }
    }))
    .unwrap()
}

const NO_TIME_LEFT_LINE: &str = "No available time left in the status range.";

fn no_providers() -> Vec<Box<dyn CalendarProvider>> {
    Vec::new()
}

// ── Vacation ────────────────────────────────────────────────────────────────

#[test]
fn active_vacation_short_circuits_without_questions() {
    let tomorrow = today() + Duration::days(1);
    let config = config(json!({ "vacation": { "untilDate": tomorrow.to_string() } }));
    let mut session = Session::new(&config, at(9, 0)).unwrap();
    let mut prompt = ScriptedPrompt::default();

    let update = session.compose(&mut prompt, &mut no_providers()).unwrap();

    assert_eq!(update.text, "On vacation. Will be back on 3/18");
    assert_eq!(update.emoji, ":palm_tree:");
    assert_eq!(update.expiration, end_of_day_utc(tomorrow));
    assert!(prompt.transcript.is_empty());
}

#[test]
fn vacation_ending_today_is_over() {
    let config = config(json!({ "vacation": { "untilDate": today().to_string() } }));
    let session = Session::new(&config, at(9, 0)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["y", "y"]);

    assert!(session.active_vacation().is_none());
    assert_eq!(session.choose_mode(&mut prompt).unwrap(), Mode::FullyManual);
}

// ── Mode selection ─────────────────────────────────────────────────────────

#[test]
fn declining_manual_mode_uses_automatic_bounds() {
    let config = config(json!({}));
    let session = Session::new(&config, at(9, 0)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["n"]);

    assert_eq!(
        session.choose_mode(&mut prompt).unwrap(),
        Mode::PartiallyAutomatic(BoundsSource::Automatic)
    );
    assert!(prompt.said("Do you want to set the status manually?"));
}

#[test]
fn fully_manual_status_is_taken_verbatim() {
    let config = config(json!({ "statusEmoji": ":house:" }));
    let mut session = Session::new(&config, at(9, 0)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["y", "y", "Working from home, ping me"]);

    let update = session.compose(&mut prompt, &mut no_providers()).unwrap();

    assert_eq!(update.text, "Working from home, ping me");
    assert_eq!(update.emoji, ":house:");
    assert_eq!(update.expiration, end_of_day_utc(today()));
}

// ── Partially automatic ────────────────────────────────────────────────────

#[test]
fn interactive_schedule_with_a_meeting_and_a_break() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(7, 30)).unwrap();
    let mut prompt = ScriptedPrompt::new(&[
        "y", "n", // manual, not fully manual
        "08:00", "16:00", // bounds
        "y", "10:00", "11:00", "n", // one meeting
        "y", "12:00", "12:30", "n", // one break
    ]);

    let update = session.compose(&mut prompt, &mut no_providers()).unwrap();

    assert_eq!(
        update.text,
        "08:00 - 12:00, 12:30 - 16:00 (:calendar: 10:00 - 11:00)"
    );
    assert_eq!(update.emoji, ":speech_balloon:");
    assert!(prompt.said("Would you like to add a meeting? Current status is: 08:00 - 16:00."));
    assert!(prompt.said(
        "Would you like to add another meeting? Current status is: \
         08:00 - 16:00 (:calendar: 10:00 - 11:00)."
    ));
    assert!(prompt.said(
        "Would you like to add another break? Current status is: \
         08:00 - 12:00, 12:30 - 16:00 (:calendar: 10:00 - 11:00)."
    ));
}

#[test]
fn invalid_times_are_reprompted() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(7, 30)).unwrap();
    let mut prompt = ScriptedPrompt::new(&[
        "y", "n",
        "08:00", "7:00", "07:00", "16:00", // bad format, then before the start
        "y", "10:00", "11:00", "n",
        "y", "10:30", "13:00", "12:00", "13:30", "n", // inside the meeting, then before the start
    ]);

    let update = session.compose(&mut prompt, &mut no_providers()).unwrap();

    assert_eq!(
        update.text,
        "08:00 - 13:00, 13:30 - 16:00 (:calendar: 10:00 - 11:00)"
    );
    assert!(prompt.said("Invalid input, please set: hh:mm"));
    assert!(prompt.said("Time must be after 08:00"));
    assert!(prompt.said("Time must be between one of these windows: 08:00 - 10:00, 11:00 - 16:00"));
    assert!(prompt.said("Time must be after 13:00 and before 16:00"));
}

#[test]
fn status_range_must_not_be_empty() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(7, 30)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["y", "n", "08:00", "08:00", "12:00", "n", "n"]);

    let update = session.compose(&mut prompt, &mut no_providers()).unwrap();

    assert_eq!(update.text, "08:00 - 12:00");
    assert!(prompt.said("Time must be after 08:00"));
}

#[test]
fn automatic_range_at_the_end_of_the_day_is_refused() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(23, 50)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["n"]);

    let result = session.compose(&mut prompt, &mut no_providers());

    assert!(matches!(result, Err(StatusError::EmptyStatusRange(t)) if t == at(23, 59)));
    assert!(!prompt.said(NO_TIME_LEFT_LINE));
}

#[test]
fn zero_length_meeting_is_ignored() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(7, 30)).unwrap();
    let mut prompt = ScriptedPrompt::new(&[
        "y", "n", "08:00", "16:00",
        "y", "10:00", "10:00", "n",
        "n",
    ]);

    let update = session.compose(&mut prompt, &mut no_providers()).unwrap();

    assert_eq!(update.text, "08:00 - 16:00");
    assert!(prompt.said("Zero-length meeting ignored."));
}

#[test]
fn loops_stop_when_no_time_is_left() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(7, 30)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["y", "n", "09:00", "10:00", "y", "09:00", "10:00"]);

    let update = session.compose(&mut prompt, &mut no_providers()).unwrap();

    assert_eq!(update.text, "09:00 - 10:00 (:calendar: 09:00 - 10:00)");
    assert!(prompt.said(NO_TIME_LEFT_LINE));
    assert!(prompt.answers.is_empty());
}

#[test]
fn closed_prompt_aborts_composition() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(7, 30)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["y", "n", "08:00"]);

    let result = session.compose(&mut prompt, &mut no_providers());
    assert!(matches!(result, Err(StatusError::Prompt(_))));
}

#[test]
fn automatic_bounds_with_calendar_meetings() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(8, 7)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["n", "n", "n"]);

    let standup = google_event("2026-03-16T10:00:00+01:00", "2026-03-16T10:15:00+01:00");
    let mut providers: Vec<Box<dyn CalendarProvider>> = vec![
        Box::new(StaticProvider::new(
            SourceKind::GoogleCalendar,
            vec![standup.clone()],
        )),
        Box::new(
            StaticProvider::new(SourceKind::AzureTeams, Vec::new())
                .failing_with(vec![FetchError::Failed("503".into())]),
        ),
        Box::new(StaticProvider::new(SourceKind::GoogleCalendar, vec![standup])),
    ];

    let update = session.compose(&mut prompt, &mut providers).unwrap();

    assert_eq!(update.text, "08:15 - 16:45 (:calendar: 10:00 - 10:15)");
    assert!(prompt.said("Imported 1 meeting(s) from calendar integrations."));
    assert!(prompt.said(
        "Would you like to add another meeting? Current status is: \
         08:15 - 16:45 (:calendar: 10:00 - 10:15)."
    ));
}

#[test]
fn manual_meeting_cannot_start_inside_an_imported_one() {
    let config = config(json!({}));
    let mut session = Session::new(&config, at(8, 0)).unwrap();
    let mut prompt = ScriptedPrompt::new(&["n", "y", "10:30", "11:30", "12:00", "n", "n"]);

    let mut providers: Vec<Box<dyn CalendarProvider>> = vec![Box::new(StaticProvider::new(
        SourceKind::GoogleCalendar,
        vec![google_event("2026-03-16T10:00:00", "2026-03-16T11:00:00")],
    ))];

    let update = session.compose(&mut prompt, &mut providers).unwrap();

    assert_eq!(
        update.text,
        "08:00 - 16:30 (:calendar: 10:00 - 11:00, 11:30 - 12:00)"
    );
    assert!(prompt.said(
        "Time must be between one of these windows: 08:00 - 10:00, 11:00 - 16:30"
    ));
}

// ── Calendar fetch policy ──────────────────────────────────────────────────

#[test]
fn reauth_required_triggers_one_retry() {
    let provider = StaticProvider::new(
        SourceKind::GoogleCalendar,
        vec![google_event("2026-03-16T13:00:00", "2026-03-16T14:00:00")],
    )
    .failing_with(vec![FetchError::ReauthRequired("expired".into())]);
    let (fetches, reauths) = (provider.fetches.clone(), provider.reauths.clone());
    let mut providers: Vec<Box<dyn CalendarProvider>> = vec![Box::new(provider)];

    let meetings = collect_meetings(&mut providers, &LocalZone::System, today());

    assert_eq!(meetings, vec![iv(13, 0, 14, 0)]);
    assert_eq!(fetches.get(), 2);
    assert_eq!(reauths.get(), 1);
}

#[test]
fn second_reauth_failure_gives_up_without_stopping_other_providers() {
    let stubborn = StaticProvider::new(SourceKind::GoogleCalendar, Vec::new()).failing_with(vec![
        FetchError::ReauthRequired("expired".into()),
        FetchError::ReauthRequired("still expired".into()),
        FetchError::ReauthRequired("never reached".into()),
    ]);
    let (fetches, reauths) = (stubborn.fetches.clone(), stubborn.reauths.clone());
    let healthy = StaticProvider::new(
        SourceKind::GoogleCalendar,
        vec![google_event("2026-03-16T15:00:00", "2026-03-16T15:30:00")],
    );
    let mut providers: Vec<Box<dyn CalendarProvider>> = vec![Box::new(stubborn), Box::new(healthy)];

    let meetings = collect_meetings(&mut providers, &LocalZone::System, today());

    assert_eq!(meetings, vec![iv(15, 0, 15, 30)]);
    assert_eq!(fetches.get(), 2);
    assert_eq!(reauths.get(), 1);
}

#[test]
fn plain_failures_are_not_retried() {
    let provider = StaticProvider::new(SourceKind::AzureTeams, Vec::new())
        .failing_with(vec![FetchError::Failed("boom".into())]);
    let (fetches, reauths) = (provider.fetches.clone(), provider.reauths.clone());
    let mut providers: Vec<Box<dyn CalendarProvider>> = vec![Box::new(provider)];

    assert!(collect_meetings(&mut providers, &LocalZone::System, today()).is_empty());
    assert_eq!(fetches.get(), 1);
    assert_eq!(reauths.get(), 0);
}

// ── Publishing ─────────────────────────────────────────────────────────────

fn sample_update() -> StatusUpdate {
    StatusUpdate {
        text: "08:00 - 16:00".into(),
        emoji: ":speech_balloon:".into(),
        expiration: end_of_day_utc(today()),
    }
}

#[test]
fn failing_account_does_not_stop_the_others() {
    let config = config(json!({}));
    let session = Session::new(&config, at(9, 0)).unwrap();
    let log = EventLog::default();
    let mut prompt = ScriptedPrompt {
        log: log.clone(),
        ..Default::default()
    };
    let publisher = RecordingPublisher {
        failures: HashMap::from([("U2".to_string(), "invalid_auth".to_string())]),
        log: log.clone(),
        ..Default::default()
    };

    let reports = session.publish(&sample_update(), &publisher, &mut prompt);

    let results: Vec<(usize, bool)> = reports.iter().map(|r| (r.index, r.outcome.ok)).collect();
    assert_eq!(results, vec![(0, true), (1, false), (2, true)]);
    assert_eq!(reports[1].outcome.error.as_deref(), Some("invalid_auth"));

    let called: Vec<String> = publisher.calls.borrow().iter().map(|(u, _)| u.clone()).collect();
    assert_eq!(called, vec!["U1", "U2", "U3"]);

    assert!(prompt.said("Configuring the 3. workspace..."));
    assert!(prompt.said("Error on setting slack status: invalid_auth"));
    assert_eq!(prompt.transcript.iter().filter(|l| *l == "Done").count(), 2);
    assert!(!prompt.said("Slack response:"));

    let events = log.borrow();
    let progress: Vec<&str> = events
        .iter()
        .map(String::as_str)
        .skip_while(|line| !line.starts_with("Configuring"))
        .collect();
    assert_eq!(
        progress,
        vec![
            "Configuring the 1. workspace...",
            "publish U1",
            "Done",
            "Configuring the 2. workspace...",
            "publish U2",
            "Error on setting slack status: invalid_auth",
            "Configuring the 3. workspace...",
            "publish U3",
            "Done",
        ]
    );
}

#[test]
fn verbose_output_shows_raw_responses() {
    let config = config(json!({ "silentOutput": false }));
    let session = Session::new(&config, at(9, 0)).unwrap();
    let mut prompt = ScriptedPrompt::default();
    let publisher = RecordingPublisher::default();

    session.publish(&sample_update(), &publisher, &mut prompt);

    assert_eq!(
        prompt.transcript.iter().filter(|l| *l == "Slack response:").count(),
        3
    );
    assert!(prompt.said(r#"{"ok":true}"#));
}

#[test]
fn every_account_receives_the_same_update() {
    let config = config(json!({}));
    let session = Session::new(&config, at(9, 0)).unwrap();
    let publisher = RecordingPublisher::default();
    let update = sample_update();

    session.publish(&update, &publisher, &mut ScriptedPrompt::default());

    assert!(publisher.calls.borrow().iter().all(|(_, u)| *u == update));
}
