//! Error types for the HTTP integrations.

use daystatus_core::{FetchError, SourceKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Token request failed: {0}")]
    Auth(String),

    #[error("Invalid credentials for {kind} integration #{instance}: {reason}")]
    Credentials {
        kind: SourceKind,
        instance: usize,
        reason: String,
    },

    #[error("Invalid request window: {0}")]
    Window(String),
}

impl From<IntegrationError> for FetchError {
    fn from(error: IntegrationError) -> Self {
        FetchError::Failed(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IntegrationError>;
