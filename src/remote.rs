//! Client for a running cfseeker server
//!
//! Used by the CLI when `--target` is given. Requests mirror the server's
//! `/v1` routes and errors carry the server's `meta.error` text.

use crate::api::{ApiResponse, ServerInfo};
use crate::clients::http::{build_agent, join_url};
use crate::error::{SeekerError, SeekerResult};
use crate::seeker::{ConvertOutput, ConvertRequest, FindOutput, FindRequest};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use ureq::http::Response;
use ureq::{Agent, Body};

/// A reply's contents plus any warning the server attached
#[derive(Debug)]
pub struct Reply<T> {
    pub contents: T,
    pub warning: Option<String>,
}

pub struct RemoteClient {
    agent: Agent,
    target: String,
}

impl RemoteClient {
    pub fn new(target: &str, timeout: Duration, skip_ssl_validation: bool) -> Self {
        Self {
            agent: build_agent(timeout, skip_ssl_validation),
            target: target.trim().to_string(),
        }
    }

    pub fn find(&self, request: &FindRequest) -> SeekerResult<Reply<FindOutput>> {
        let query: Vec<(&str, &str)> = match request {
            FindRequest::ByGuid(guid) => vec![("app_guid", guid.as_str())],
            FindRequest::ByName { org, space, app } => vec![
                ("org_name", org.as_str()),
                ("space_name", space.as_str()),
                ("app_name", app.as_str()),
            ],
        };
        self.get("/v1/apps", &query)
    }

    pub fn convert(&self, request: &ConvertRequest) -> SeekerResult<Reply<ConvertOutput>> {
        let query: Vec<(&str, &str)> = match request {
            ConvertRequest::ByGuid(guid) => vec![("guid", guid.as_str())],
            ConvertRequest::ByOrg(org) => vec![("org_name", org.as_str())],
            ConvertRequest::BySpace { org, space } => {
                vec![("org_name", org.as_str()), ("space_name", space.as_str())]
            }
            ConvertRequest::ByApp { org, space, app } => vec![
                ("org_name", org.as_str()),
                ("space_name", space.as_str()),
                ("app_name", app.as_str()),
            ],
        };
        self.get("/v1/convert", &query)
    }

    pub fn info(&self) -> SeekerResult<Reply<ServerInfo>> {
        self.get("/v1/meta", &[])
    }

    /// Wipe the server's VM cache, returning its confirmation message
    pub fn invalidate(&self) -> SeekerResult<String> {
        let url = join_url(&self.target, "/v1/cache/bosh");
        debug!("DELETE {}", url);
        let response = self
            .agent
            .delete(&url)
            .call()
            .map_err(|e| SeekerError::http(format!("DELETE {}", url), e))?;
        let envelope: ApiResponse<serde_json::Value> = decode(response, &url)?;
        Ok(envelope
            .meta
            .and_then(|m| m.message)
            .unwrap_or_else(|| "Cache invalidated".to_string()))
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> SeekerResult<Reply<T>> {
        let url = join_url(&self.target, path);
        debug!("GET {} {:?}", url, query);

        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let response = request
            .call()
            .map_err(|e| SeekerError::http(format!("GET {}", url), e))?;

        let envelope: ApiResponse<T> = decode(response, &url)?;
        let warning = envelope.meta.and_then(|m| m.warning);
        let contents = envelope.contents.ok_or_else(|| SeekerError::BadResponse {
            context: url.clone(),
            reason: "response has no contents".to_string(),
        })?;
        Ok(Reply { contents, warning })
    }
}

/// Parse the envelope, turning error statuses into `SeekerError::Remote`
fn decode<T: DeserializeOwned>(
    mut response: Response<Body>,
    url: &str,
) -> SeekerResult<ApiResponse<T>> {
    let status = response.status();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| SeekerError::http(url, e))?;

    let parsed = serde_json::from_str::<ApiResponse<T>>(&body);
    if !status.is_success() {
        let message = parsed
            .ok()
            .and_then(|envelope| envelope.meta)
            .and_then(|meta| meta.error)
            .unwrap_or_else(|| body.trim().to_string());
        return Err(SeekerError::Remote {
            status: status.as_u16(),
            message,
        });
    }

    parsed.map_err(|e| SeekerError::BadResponse {
        context: url.to_string(),
        reason: e.to_string(),
    })
}
