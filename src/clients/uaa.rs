//! UAA tokens with in-memory caching

use super::http::{decode_json, read_body};
use crate::error::{SeekerError, SeekerResult};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use ureq::Agent;

/// A bearer token and when it stops being valid
#[derive(Debug, Clone)]
pub(crate) struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Lifetimes past the representable range saturate instead of overflowing
    pub fn new(value: String, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(expires_in_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(if expires_in_secs > 0 {
                DateTime::<Utc>::MAX_UTC
            } else {
                now
            });
        Self { value, expires_at }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        // Add 60 second buffer to avoid sending almost-expired tokens
        Utc::now() >= self.expires_at - Duration::seconds(60)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    600
}

/// Public UAA client the BOSH CLI logs users in with
const BOSH_CLI_CLIENT: &str = "bosh_cli";

/// OAuth grant used to obtain tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Grant {
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    /// User login through the public `bosh_cli` client
    Password { username: String, password: String },
}

impl Grant {
    fn form(&self) -> Vec<(&str, &str)> {
        match self {
            Self::ClientCredentials {
                client_id,
                client_secret,
            } => vec![
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ],
            Self::Password { username, password } => vec![
                ("grant_type", "password"),
                ("client_id", BOSH_CLI_CLIENT),
                ("client_secret", ""),
                ("username", username.as_str()),
                ("password", password.as_str()),
            ],
        }
    }
}

/// Fetches and caches tokens from a UAA server
pub(crate) struct TokenSource {
    token_url: String,
    grant: Grant,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenSource {
    /// `uaa_url` is the UAA base URL; `/oauth/token` is appended
    pub fn new(uaa_url: &str, grant: Grant) -> Self {
        Self {
            token_url: format!("{}/oauth/token", uaa_url.trim_end_matches('/')),
            grant,
            cached: Mutex::new(None),
        }
    }

    /// Get a valid token, requesting a new one if the cached one expired
    pub fn token(&self, agent: &Agent) -> SeekerResult<String> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.value.clone());
        }

        debug!("Requesting token from {}", self.token_url);
        let token = self.request(agent)?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn request(&self, agent: &Agent) -> SeekerResult<AccessToken> {
        let response = agent
            .post(&self.token_url)
            .header("Accept", "application/json")
            .send_form(self.grant.form())
            .map_err(|e| SeekerError::Token {
                endpoint: self.token_url.clone(),
                reason: e.to_string(),
            })?;

        let body = read_body(response, &self.token_url).map_err(|e| SeekerError::Token {
            endpoint: self.token_url.clone(),
            reason: e.to_string(),
        })?;
        let parsed: TokenResponse = decode_json(&body, &self.token_url)?;
        Ok(AccessToken::new(parsed.access_token, parsed.expires_in))
    }
}
