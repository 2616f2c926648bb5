//! Calendar provider interface and the per-integration fetch policy.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::clock::LocalZone;
use crate::interval::Interval;
use crate::normalize::{normalize, RawEvent, SourceKind};

/// Why a calendar fetch failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The provider could not refresh its credentials; it needs
    /// [`CalendarProvider::reauthenticate`] before another fetch can succeed.
    #[error("token refresh failed, re-authentication required: {0}")]
    ReauthRequired(String),

    #[error("{0}")]
    Failed(String),
}

/// A configured calendar integration.
pub trait CalendarProvider {
    fn kind(&self) -> SourceKind;

    /// Position among the configured integrations of the same kind.
    fn instance(&self) -> usize;

    /// Fetch the provider-native records of upcoming events.
    fn fetch_raw_events(&mut self) -> Result<Vec<RawEvent>, FetchError>;

    /// Obtain fresh credentials after a [`FetchError::ReauthRequired`].
    fn reauthenticate(&mut self) -> Result<(), FetchError>;
}

/// Fetch with the retry-once policy: a `ReauthRequired` failure triggers one
/// re-authentication and one more fetch.
pub fn fetch_with_reauth(provider: &mut dyn CalendarProvider) -> Result<Vec<RawEvent>, FetchError> {
    match provider.fetch_raw_events() {
        Err(FetchError::ReauthRequired(reason)) => {
            info!(
                source = %provider.kind(),
                instance = provider.instance(),
                %reason,
                "re-authenticating calendar integration"
            );
            provider.reauthenticate()?;
            provider.fetch_raw_events()
        }
        other => other,
    }
}

/// Today's meetings from every provider, in provider order.
///
/// A provider that fails contributes nothing; the failure is logged and the
/// remaining providers are still asked.
pub fn collect_meetings(
    providers: &mut [Box<dyn CalendarProvider>],
    zone: &LocalZone,
    today: NaiveDate,
) -> Vec<Interval> {
    let mut meetings = Vec::new();
    for provider in providers.iter_mut() {
        let kind = provider.kind();
        let instance = provider.instance();
        match fetch_with_reauth(provider.as_mut()) {
            Ok(raw) => {
                let found = normalize(&raw, kind, zone, today);
                info!(
                    source = %kind,
                    instance,
                    fetched = raw.len(),
                    today = found.len(),
                    "calendar integration fetched"
                );
                meetings.extend(found);
            }
            Err(error) => {
                warn!(source = %kind, instance, %error, "calendar integration failed");
            }
        }
    }
    meetings
}
