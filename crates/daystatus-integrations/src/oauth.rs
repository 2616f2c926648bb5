//! OAuth 2.0 token grants.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{IntegrationError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// POST a form-encoded grant to `token_url`.
pub fn request_token(client: &Client, token_url: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
    debug!(token_url, "requesting access token");

    let response = client.post(token_url).form(form).send()?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(IntegrationError::Auth(format!("{status}: {body}")));
    }

    response
        .json::<TokenResponse>()
        .map_err(|e| IntegrationError::Auth(format!("unreadable token response: {e}")))
}

/// Exchange a refresh token for a new access token.
pub fn refresh_token_grant(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse> {
    request_token(
        client,
        token_url,
        &[
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ],
    )
}

/// App-only token for a confidential client.
pub fn client_credentials_grant(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    scope: &str,
) -> Result<TokenResponse> {
    request_token(
        client,
        token_url,
        &[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", scope),
        ],
    )
}
