//! Presence publisher interface and the per-account publish loop.

use tracing::{info, warn};

use crate::config::Account;

/// The status as it is sent to every account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub text: String,
    pub emoji: String,
    /// Seconds since the Unix epoch.
    pub expiration: i64,
}

/// Result of one publish call.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub ok: bool,
    pub error: Option<String>,
    /// The service's response body, when one was received.
    pub raw: Option<serde_json::Value>,
}

impl PublishOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            raw: None,
        }
    }
}

pub trait PresencePublisher {
    /// Publish `update` for `account`. Failures are reported in the outcome,
    /// never raised.
    fn publish(&self, update: &StatusUpdate, account: &Account) -> PublishOutcome;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountReport {
    /// Zero-based position of the account in the configuration.
    pub index: usize,
    pub user_id: String,
    pub outcome: PublishOutcome,
}

/// Progress of [`publish_all`], reported around each publish call.
#[derive(Debug, Clone, Copy)]
pub enum PublishStep<'a> {
    /// About to publish for the account at `index`.
    Starting { index: usize },
    Finished(&'a AccountReport),
}

/// Publish to every account in order; a failing account does not stop the loop.
///
/// `observe` sees each account before its call is made and again with the
/// outcome, so progress can be shown while the calls are in flight.
pub fn publish_all(
    publisher: &dyn PresencePublisher,
    accounts: &[Account],
    update: &StatusUpdate,
    mut observe: impl FnMut(PublishStep<'_>),
) -> Vec<AccountReport> {
    let mut reports = Vec::with_capacity(accounts.len());
    for (index, account) in accounts.iter().enumerate() {
        observe(PublishStep::Starting { index });

        let outcome = publisher.publish(update, account);
        if outcome.ok {
            info!(account = index + 1, user_id = %account.user_id, "status published");
        } else {
            warn!(
                account = index + 1,
                user_id = %account.user_id,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "status publish failed"
            );
        }

        let report = AccountReport {
            index,
            user_id: account.user_id.clone(),
            outcome,
        };
        observe(PublishStep::Finished(&report));
        reports.push(report);
    }
    reports
}
