//! Microsoft Graph calendar provider (the "azure-teams" integration).
//!
//! Uses an app-only token from the client-credentials grant and reads the
//! calendar view of one user for the current local day. Graph is asked to
//! report times in UTC; conversion to the local zone happens in normalization.
//! Result pages are followed through `@odata.nextLink`.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use daystatus_core::{CalendarProvider, FetchError, LocalZone, RawEvent, SourceKind};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{IntegrationError, Result};
use crate::oauth::client_credentials_grant;

pub const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";
pub const LOGIN_BASE: &str = "https://login.microsoftonline.com";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
const PAGE_SIZE: &str = "100";
const MAX_PAGES: usize = 20;
const PREFER_UTC: &str = "outlook.timezone=\"UTC\"";

/// Credentials of one Azure app registration with calendar read access.
#[derive(Clone, Deserialize)]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// The user whose calendar is read.
    pub user_id: String,
}

impl AzureCredentials {
    pub fn from_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }
}

#[derive(Debug, Deserialize)]
struct GraphEventsResponse {
    #[serde(default)]
    value: Vec<RawEvent>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

pub struct GraphCalendarProvider {
    instance: usize,
    credentials: AzureCredentials,
    zone: LocalZone,
    access_token: Option<String>,
    client: Client,
    api_base: String,
    login_base: String,
}

impl GraphCalendarProvider {
    pub fn new(
        instance: usize,
        credentials: AzureCredentials,
        zone: LocalZone,
        client: Client,
    ) -> Self {
        Self {
            instance,
            credentials,
            zone,
            access_token: None,
            client,
            api_base: GRAPH_API_BASE.to_string(),
            login_base: LOGIN_BASE.to_string(),
        }
    }

    /// Point the provider at other endpoints (e.g. a local test server).
    pub fn with_endpoints(mut self, api_base: &str, login_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.login_base = login_base.trim_end_matches('/').to_string();
        self
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_base, self.credentials.tenant_id
        )
    }

    fn acquire_token(&mut self) -> Result<String> {
        let token = client_credentials_grant(
            &self.client,
            &self.token_url(),
            &self.credentials.client_id,
            &self.credentials.client_secret,
            GRAPH_SCOPE,
        )?;
        self.access_token = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    /// Today in the local zone, as a UTC `[start, end)` pair.
    fn today_window(&self) -> Result<(String, String)> {
        let today = self.zone.now().date();
        let day_start = today.and_time(NaiveTime::MIN);
        let to_utc = |local: NaiveDateTime| -> Result<String> {
            let seconds = self
                .zone
                .epoch_seconds(local)
                .map_err(|e| IntegrationError::Window(e.to_string()))?;
            let instant = DateTime::<Utc>::from_timestamp(seconds, 0)
                .ok_or_else(|| IntegrationError::Window(format!("timestamp {seconds}")))?;
            Ok(instant.to_rfc3339_opts(SecondsFormat::Secs, true))
        };
        Ok((to_utc(day_start)?, to_utc(day_start + Duration::days(1))?))
    }

    fn calendar_view(&self, access_token: &str) -> Result<reqwest::blocking::Response> {
        let url = format!(
            "{}/users/{}/calendarView",
            self.api_base, self.credentials.user_id
        );
        let (start, end) = self.today_window()?;
        debug!(instance = self.instance, %url, %start, %end, "listing graph calendar view");

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .header("Prefer", PREFER_UTC)
            .query(&[
                ("startDateTime", start.as_str()),
                ("endDateTime", end.as_str()),
                ("$top", PAGE_SIZE),
            ])
            .send()?;
        Ok(response)
    }

    /// Follow an `@odata.nextLink`; the link already carries the query.
    fn next_page(&self, link: &str, access_token: &str) -> Result<reqwest::blocking::Response> {
        debug!(instance = self.instance, %link, "following graph next link");
        let response = self
            .client
            .get(link)
            .bearer_auth(access_token)
            .header("Prefer", PREFER_UTC)
            .send()?;
        Ok(response)
    }

    fn read_page(
        &mut self,
        response: reqwest::blocking::Response,
    ) -> std::result::Result<GraphEventsResponse, FetchError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.access_token = None;
            return Err(FetchError::ReauthRequired("access token rejected".into()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(IntegrationError::Api {
                service: "Microsoft Graph",
                status: status.as_u16(),
                body,
            }
            .into());
        }
        let page = response
            .json::<GraphEventsResponse>()
            .map_err(IntegrationError::Http)?;
        Ok(page)
    }
}

impl CalendarProvider for GraphCalendarProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::AzureTeams
    }

    fn instance(&self) -> usize {
        self.instance
    }

    fn fetch_raw_events(&mut self) -> std::result::Result<Vec<RawEvent>, FetchError> {
        let access_token = match self.access_token.clone() {
            Some(token) => token,
            None => self
                .acquire_token()
                .map_err(|e| FetchError::ReauthRequired(e.to_string()))?,
        };

        let first = self.calendar_view(&access_token)?;
        let mut page = self.read_page(first)?;
        let mut events = std::mem::take(&mut page.value);
        let mut pages = 1;
        while let Some(link) = page.next_link.take() {
            if pages == MAX_PAGES {
                warn!(instance = self.instance, pages, "calendar view truncated");
                break;
            }
            let next = self.next_page(&link, &access_token)?;
            page = self.read_page(next)?;
            events.append(&mut page.value);
            pages += 1;
        }
        Ok(events)
    }

    fn reauthenticate(&mut self) -> std::result::Result<(), FetchError> {
        self.access_token = None;
        self.acquire_token()?;
        Ok(())
    }
}
