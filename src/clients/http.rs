//! Shared HTTP plumbing for the CF and BOSH clients

use crate::error::{SeekerError, SeekerResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use std::time::Duration;
use ureq::config::RedirectAuthHeaders;
use ureq::http::Response;
use ureq::tls::TlsConfig;
use ureq::{Agent, Body};

/// Longest slice of an error body kept in error messages
const ERROR_BODY_LIMIT: usize = 512;

/// Build an agent with the configured timeout and TLS policy.
///
/// Status codes are checked by the callers, and auth headers survive
/// same-host redirects (the director answers task creation with a 302).
pub(crate) fn build_agent(timeout: Duration, skip_ssl_validation: bool) -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .redirect_auth_headers(RedirectAuthHeaders::SameHost)
        .tls_config(
            TlsConfig::builder()
                .disable_verification(skip_ssl_validation)
                .build(),
        )
        .build();
    Agent::new_with_config(config)
}

/// Join a base address and an absolute path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// `Authorization` value for an OAuth token
pub(crate) fn bearer(token: &str) -> String {
    format!("bearer {}", token)
}

/// `Authorization` value for HTTP Basic credentials
pub(crate) fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// GET a URL and decode the JSON body
pub(crate) fn get_json<T: DeserializeOwned>(
    agent: &Agent,
    url: &str,
    authorization: Option<&str>,
    query: &[(&str, &str)],
) -> SeekerResult<T> {
    let body = get_text(agent, url, authorization, query)?;
    decode_json(&body, url)
}

/// GET a URL and return the raw body
pub(crate) fn get_text(
    agent: &Agent,
    url: &str,
    authorization: Option<&str>,
    query: &[(&str, &str)],
) -> SeekerResult<String> {
    let context = format!("GET {}", url);
    let mut request = agent.get(url);
    if let Some(authorization) = authorization {
        request = request.header("Authorization", authorization);
    }
    for (key, value) in query {
        request = request.query(*key, *value);
    }

    let response = request
        .call()
        .map_err(|e| SeekerError::http(context.clone(), e))?;
    read_body(response, &context)
}

/// Read a response body, turning non-2xx statuses into errors
pub(crate) fn read_body(mut response: Response<Body>, context: &str) -> SeekerResult<String> {
    let status = response.status();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| SeekerError::http(context, e))?;

    if !status.is_success() {
        return Err(SeekerError::HttpStatus {
            context: context.to_string(),
            status: status.as_u16(),
            body: excerpt(&body),
        });
    }
    Ok(body)
}

pub(crate) fn decode_json<T: DeserializeOwned>(body: &str, context: &str) -> SeekerResult<T> {
    serde_json::from_str(body).map_err(|e| SeekerError::BadResponse {
        context: context.to_string(),
        reason: e.to_string(),
    })
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
