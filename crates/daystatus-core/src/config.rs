//! Validated configuration.
//!
//! The JSON file is read into a loose camelCase shape first and turned into
//! [`Config`] once, with defaults applied and cross-field rules checked, so the
//! rest of the crate never looks at optional raw fields.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::clock::LocalZone;
use crate::error::{Result, StatusError};
use crate::normalize::SourceKind;

pub const DEFAULT_STATUS_EMOJI: &str = ":speech_balloon:";
pub const DEFAULT_MEETING_EMOJI: &str = ":calendar:";
pub const DEFAULT_VACATION_EMOJI: &str = ":palm_tree:";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    slack_api_tokens: Vec<String>,
    slack_user_ids: Vec<String>,
    status_emoji: Option<String>,
    meeting_status_emoji: Option<String>,
    silent_output: Option<bool>,
    vacation: Option<RawVacation>,
    #[serde(default)]
    integrations: RawIntegrations,
    local_time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVacation {
    until_date: String,
    status_emoji: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawIntegrations {
    #[serde(rename = "google-calendar", default)]
    google_calendar: Vec<RawIntegration>,
    #[serde(rename = "azure-teams", default)]
    azure_teams: Vec<RawIntegration>,
}

#[derive(Debug, Deserialize)]
struct RawIntegration {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    credentials: serde_json::Value,
}

/// One chat workspace to publish to.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub token: String,
    pub user_id: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vacation {
    /// Last day of the vacation.
    pub until: NaiveDate,
    pub emoji: String,
}

/// One configured calendar integration.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationConfig {
    pub kind: SourceKind,
    /// Position among the integrations of the same kind; keeps several saved
    /// sessions of one provider apart.
    pub instance: usize,
    pub enabled: bool,
    /// Provider-specific; interpreted by the provider implementation.
    pub credentials: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub accounts: Vec<Account>,
    pub status_emoji: String,
    pub meeting_emoji: String,
    pub silent_output: bool,
    pub vacation: Option<Vacation>,
    /// Google Calendar integrations first, then Azure Teams, each in file order.
    pub integrations: Vec<IntegrationConfig>,
    pub zone: LocalZone,
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate configuration JSON.
    ///
    /// # Errors
    /// Returns `StatusError::Config` for malformed JSON, token/user-id lists of
    /// different lengths, an unreadable vacation date, or an enabled
    /// `azure-teams` integration without `localTimeZone`. Returns
    /// `StatusError::InvalidTimezone` for an unknown zone name.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_str(text).map_err(|e| StatusError::Config(e.to_string()))?;

        if raw.slack_api_tokens.len() != raw.slack_user_ids.len() {
            return Err(StatusError::Config(format!(
                "slackApiTokens has {} entries but slackUserIds has {}",
                raw.slack_api_tokens.len(),
                raw.slack_user_ids.len()
            )));
        }
        let accounts = raw
            .slack_api_tokens
            .into_iter()
            .zip(raw.slack_user_ids)
            .map(|(token, user_id)| Account { token, user_id })
            .collect();

        let vacation = raw.vacation.map(parse_vacation).transpose()?;

        let zone = match raw.local_time_zone.as_deref() {
            Some(name) => LocalZone::parse(name)?,
            None => LocalZone::System,
        };

        let integrations = flatten_integrations(raw.integrations);
        let needs_zone = integrations
            .iter()
            .any(|i| i.enabled && i.kind == SourceKind::AzureTeams);
        if needs_zone && raw.local_time_zone.is_none() {
            return Err(StatusError::Config(
                "localTimeZone is required when an azure-teams integration is enabled".into(),
            ));
        }

        Ok(Config {
            accounts,
            status_emoji: raw
                .status_emoji
                .unwrap_or_else(|| DEFAULT_STATUS_EMOJI.to_string()),
            meeting_emoji: raw
                .meeting_status_emoji
                .unwrap_or_else(|| DEFAULT_MEETING_EMOJI.to_string()),
            silent_output: raw.silent_output.unwrap_or(true),
            vacation,
            integrations,
            zone,
        })
    }

    pub fn enabled_integrations(&self) -> impl Iterator<Item = &IntegrationConfig> {
        self.integrations.iter().filter(|i| i.enabled)
    }
}

fn parse_vacation(raw: RawVacation) -> Result<Vacation> {
    let until = NaiveDate::parse_from_str(&raw.until_date, "%Y-%m-%d").map_err(|_| {
        StatusError::Config(format!(
            "vacation.untilDate must be YYYY-MM-DD, got {:?}",
            raw.until_date
        ))
    })?;
    Ok(Vacation {
        until,
        emoji: raw
            .status_emoji
            .unwrap_or_else(|| DEFAULT_VACATION_EMOJI.to_string()),
    })
}

fn flatten_integrations(raw: RawIntegrations) -> Vec<IntegrationConfig> {
    let tagged = |kind: SourceKind, entries: Vec<RawIntegration>| {
        entries
            .into_iter()
            .enumerate()
            .map(move |(instance, entry)| IntegrationConfig {
                kind,
                instance,
                enabled: entry.enabled,
                credentials: entry.credentials,
            })
    };

    tagged(SourceKind::GoogleCalendar, raw.google_calendar)
        .chain(tagged(SourceKind::AzureTeams, raw.azure_teams))
        .collect()
}
