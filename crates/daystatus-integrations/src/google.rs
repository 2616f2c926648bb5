//! Google Calendar provider.
//!
//! Lists the next events of the primary calendar with a cached access token,
//! refreshing it from the configured refresh token when it is missing or
//! rejected. The interactive browser consent flow is not implemented; the
//! refresh token has to be obtained beforehand.

use chrono::{SecondsFormat, Utc};
use daystatus_core::{CalendarProvider, FetchError, RawEvent, SourceKind};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::error::{IntegrationError, Result};
use crate::oauth::refresh_token_grant;

pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const MAX_RESULTS: &str = "10";

/// Credentials of one Google Calendar integration.
///
/// Accepted flat or nested under `"installed"`, the shape Google's console
/// exports for desktop clients.
#[derive(Clone, Deserialize)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl GoogleCredentials {
    pub fn from_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        let inner = value.get("installed").unwrap_or(value);
        Self::deserialize(inner)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

pub struct GoogleCalendarProvider {
    instance: usize,
    credentials: GoogleCredentials,
    access_token: Option<String>,
    client: Client,
    api_base: String,
    token_url: String,
}

impl GoogleCalendarProvider {
    pub fn new(instance: usize, credentials: GoogleCredentials, client: Client) -> Self {
        let access_token = credentials.access_token.clone();
        Self {
            instance,
            credentials,
            access_token,
            client,
            api_base: GOOGLE_CALENDAR_API_BASE.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Point the provider at other endpoints (e.g. a local test server).
    pub fn with_endpoints(mut self, api_base: &str, token_url: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.token_url = token_url.to_string();
        self
    }

    fn refresh(&mut self) -> Result<String> {
        let token = refresh_token_grant(
            &self.client,
            &self.token_url,
            &self.credentials.client_id,
            &self.credentials.client_secret,
            &self.credentials.refresh_token,
        )?;
        self.access_token = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    fn list_events(&self, access_token: &str) -> Result<reqwest::blocking::Response> {
        let url = format!("{}/calendars/primary/events", self.api_base);
        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        debug!(instance = self.instance, %url, "listing google calendar events");

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", MAX_RESULTS),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()?;
        Ok(response)
    }
}

impl CalendarProvider for GoogleCalendarProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::GoogleCalendar
    }

    fn instance(&self) -> usize {
        self.instance
    }

    fn fetch_raw_events(&mut self) -> std::result::Result<Vec<RawEvent>, FetchError> {
        let access_token = match self.access_token.clone() {
            Some(token) => token,
            None => self
                .refresh()
                .map_err(|e| FetchError::ReauthRequired(e.to_string()))?,
        };

        let response = self.list_events(&access_token)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.access_token = None;
            return Err(FetchError::ReauthRequired("access token rejected".into()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(IntegrationError::Api {
                service: "Google Calendar",
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let events: GoogleEventsResponse = response.json().map_err(IntegrationError::Http)?;
        Ok(events.items)
    }

    fn reauthenticate(&mut self) -> std::result::Result<(), FetchError> {
        self.access_token = None;
        self.refresh()?;
        Ok(())
    }
}
