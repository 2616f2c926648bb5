//! Slack presence publisher (`users.profile.set`).

use daystatus_core::{Account, PresencePublisher, PublishOutcome, StatusUpdate};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Request body of `users.profile.set`.
#[derive(Debug, Serialize)]
pub struct ProfileSetRequest<'a> {
    pub profile: Profile<'a>,
    pub user: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Profile<'a> {
    pub status_text: &'a str,
    pub status_emoji: &'a str,
    pub status_expiration: i64,
}

impl<'a> ProfileSetRequest<'a> {
    pub fn new(update: &'a StatusUpdate, account: &'a Account) -> Self {
        Self {
            profile: Profile {
                status_text: &update.text,
                status_emoji: &update.emoji,
                status_expiration: update.expiration,
            },
            user: &account.user_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SlackResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Read Slack's `{ok, error?}` envelope. Anything unreadable counts as a failure.
pub fn parse_response(raw: serde_json::Value) -> PublishOutcome {
    let envelope = SlackResponse::deserialize(&raw).unwrap_or_default();
    PublishOutcome {
        ok: envelope.ok,
        error: envelope.error,
        raw: Some(raw),
    }
}

pub struct SlackPublisher {
    client: Client,
    base_url: String,
}

impl SlackPublisher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: SLACK_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl PresencePublisher for SlackPublisher {
    fn publish(&self, update: &StatusUpdate, account: &Account) -> PublishOutcome {
        let url = format!("{}/users.profile.set", self.base_url);
        debug!(user_id = %account.user_id, "setting slack status");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&account.token)
            .json(&ProfileSetRequest::new(update, account))
            .send();

        match response.and_then(|r| r.json::<serde_json::Value>()) {
            Ok(raw) => parse_response(raw),
            Err(error) => PublishOutcome::failed(error.to_string()),
        }
    }
}
