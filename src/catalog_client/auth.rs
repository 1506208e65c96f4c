//! Client-credentials token exchange.

use super::models::CatalogError;
use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Tokens are refreshed this long before the catalog says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Application credentials, read from a JSON file that is never versioned.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "Client-ID")]
    pub client_id: String,
    #[serde(rename = "Client-Secret")]
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {:?}", path))?;
        let credentials: Credentials = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {:?}", path))?;
        if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
            bail!("Credentials file {:?} has an empty Client-ID or Client-Secret", path);
        }
        Ok(credentials)
    }
}

/// A bearer token together with the moment it stops being usable.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<Instant>,
}

impl AccessToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() + EXPIRY_MARGIN >= at)
            .unwrap_or(false)
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

/// Exchanges the application credentials for a bearer token.
pub fn request_access_token(
    client: &Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<AccessToken, CatalogError> {
    let response = client
        .post(auth_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .send()
        .map_err(CatalogError::from_transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(CatalogError::Auth(format!(
            "token endpoint returned status {}: {}",
            status.as_u16(),
            body
        )));
    }

    let body: TokenResponse = response
        .json()
        .map_err(|e| CatalogError::Auth(format!("Failed to parse token response: {}", e)))?;

    token_from_response(body)
}

fn token_from_response(body: TokenResponse) -> Result<AccessToken, CatalogError> {
    let token = body
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CatalogError::Auth("token response has no access_token".to_string()))?;

    Ok(AccessToken {
        token,
        expires_at: body
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
    })
}
