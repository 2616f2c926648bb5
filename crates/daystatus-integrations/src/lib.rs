//! # daystatus-integrations
//!
//! Blocking HTTP implementations of the daystatus collaborators.
//!
//! ## Modules
//!
//! - [`slack`] — publishes the status with `users.profile.set`
//! - [`google`] — Google Calendar events for the primary calendar
//! - [`graph`] — Microsoft Graph calendar view ("azure-teams" integrations)
//! - [`oauth`] — token grants shared by the calendar providers
//! - [`error`] — Error types

pub mod error;
pub mod google;
pub mod graph;
pub mod oauth;
pub mod slack;

use std::time::Duration;

use daystatus_core::{CalendarProvider, Config, IntegrationConfig, SourceKind};
use reqwest::blocking::Client;
use tracing::warn;

pub use error::{IntegrationError, Result};
pub use google::{GoogleCalendarProvider, GoogleCredentials};
pub use graph::{AzureCredentials, GraphCalendarProvider};
pub use slack::SlackPublisher;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The HTTP client shared by every integration.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(IntegrationError::Http)
}

/// Build a provider for every enabled integration, in configuration order.
///
/// Integrations whose credentials cannot be read are logged and skipped, so a
/// broken entry does not keep the others from running.
pub fn build_providers(config: &Config, client: &Client) -> Vec<Box<dyn CalendarProvider>> {
    config
        .enabled_integrations()
        .filter_map(|integration| match build_provider(integration, config, client) {
            Ok(provider) => Some(provider),
            Err(error) => {
                warn!(
                    source = %integration.kind,
                    instance = integration.instance,
                    %error,
                    "skipping calendar integration"
                );
                None
            }
        })
        .collect()
}

fn build_provider(
    integration: &IntegrationConfig,
    config: &Config,
    client: &Client,
) -> Result<Box<dyn CalendarProvider>> {
    let credentials_error = |e: serde_json::Error| IntegrationError::Credentials {
        kind: integration.kind,
        instance: integration.instance,
        reason: e.to_string(),
    };

    Ok(match integration.kind {
        SourceKind::GoogleCalendar => {
            let credentials =
                GoogleCredentials::from_value(&integration.credentials).map_err(credentials_error)?;
            Box::new(GoogleCalendarProvider::new(
                integration.instance,
                credentials,
                client.clone(),
            ))
        }
        SourceKind::AzureTeams => {
            let credentials =
                AzureCredentials::from_value(&integration.credentials).map_err(credentials_error)?;
            Box::new(GraphCalendarProvider::new(
                integration.instance,
                credentials,
                config.zone,
                client.clone(),
            ))
        }
    })
}
