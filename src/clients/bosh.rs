//! BOSH director client
//!
//! Listing VMs with their IPs is an asynchronous director task: the request
//! is redirected to a task resource, which is polled until it finishes, and
//! the VM list is read from the task's NDJSON result output.
//!
//! The director's `/info` tells which login it expects: HTTP Basic with the
//! configured user, or UAA tokens.

use super::http::{basic, bearer, build_agent, get_json, get_text, join_url};
use super::uaa::{Grant, TokenSource};
use super::{DeploymentVm, Director};
use crate::config::BoshConfig;
use crate::error::{SeekerError, SeekerResult};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::debug;
use ureq::Agent;

#[derive(Deserialize)]
struct DirectorInfo {
    user_authentication: UserAuthentication,
}

#[derive(Deserialize)]
struct UserAuthentication {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Option<UaaOptions>,
}

#[derive(Deserialize)]
struct UaaOptions {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct Task {
    id: u64,
    state: String,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Deserialize)]
struct VmEntry {
    #[serde(default)]
    job_name: Option<String>,
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    ips: Vec<String>,
}

/// How requests to the director are authorized, settled on first use
enum DirectorAuth {
    Basic(String),
    Uaa(TokenSource),
}

/// Blocking client for a BOSH director
pub struct BoshClient {
    agent: Agent,
    api_address: String,
    username: String,
    password: String,
    client_id: String,
    client_secret: String,
    auth: OnceLock<DirectorAuth>,
    poll_interval: Duration,
    task_timeout: Duration,
}

impl BoshClient {
    /// Create a client; nothing is contacted until the first fetch
    pub fn new(config: &BoshConfig, timeout: Duration) -> SeekerResult<Self> {
        if config.api_address.trim().is_empty() {
            return Err(SeekerError::ConfigMissing("bosh.api_address"));
        }

        Ok(Self {
            agent: build_agent(timeout, config.skip_ssl_validation),
            api_address: config.api_address.trim().to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth: OnceLock::new(),
            poll_interval: config.task_poll_interval(),
            task_timeout: config.task_timeout(),
        })
    }

    /// Value for the `Authorization` header of director requests
    fn authorization(&self) -> SeekerResult<String> {
        if self.auth.get().is_none() {
            let url = join_url(&self.api_address, "/info");
            debug!("Discovering director auth from {}", url);
            let info: DirectorInfo = get_json(&self.agent, &url, None, &[])?;
            let _ = self.auth.set(self.director_auth(info, &url)?);
        }

        match self.auth.get() {
            Some(DirectorAuth::Basic(header)) => Ok(header.clone()),
            Some(DirectorAuth::Uaa(source)) => Ok(bearer(&source.token(&self.agent)?)),
            None => Err(SeekerError::Internal("director auth not initialised".to_string())),
        }
    }

    fn director_auth(&self, info: DirectorInfo, context: &str) -> SeekerResult<DirectorAuth> {
        Ok(match auth_scheme(info, context)? {
            AuthScheme::Basic => DirectorAuth::Basic(basic(&self.username, &self.password)),
            AuthScheme::Uaa(url) => DirectorAuth::Uaa(TokenSource::new(&url, self.grant())),
        })
    }

    /// Client credentials when a client is configured, otherwise a user login
    fn grant(&self) -> Grant {
        if self.client_id.is_empty() {
            Grant::Password {
                username: self.username.clone(),
                password: self.password.clone(),
            }
        } else {
            Grant::ClientCredentials {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
            }
        }
    }

    fn task(&self, id: u64) -> SeekerResult<Task> {
        let authorization = self.authorization()?;
        get_json(
            &self.agent,
            &join_url(&self.api_address, &format!("/tasks/{}", id)),
            Some(&authorization),
            &[],
        )
    }

    fn wait_for_task(&self, mut task: Task) -> SeekerResult<Task> {
        let started = Instant::now();
        loop {
            match task.state.as_str() {
                "done" => return Ok(task),
                "error" | "cancelled" | "timeout" => {
                    return Err(SeekerError::TaskFailed {
                        id: task.id,
                        result: task.result.unwrap_or_default(),
                        state: task.state,
                    })
                }
                _ => {}
            }

            if started.elapsed() >= self.task_timeout {
                return Err(SeekerError::TaskTimeout {
                    id: task.id,
                    secs: self.task_timeout.as_secs(),
                });
            }

            debug!("Director task {} is {}, polling", task.id, task.state);
            std::thread::sleep(self.poll_interval);
            task = self.task(task.id)?;
        }
    }
}

impl Director for BoshClient {
    fn deployment_vms(&self, deployment: &str) -> SeekerResult<Vec<DeploymentVm>> {
        let authorization = self.authorization()?;
        let url = join_url(&self.api_address, &format!("/deployments/{}/vms", deployment));

        debug!("Starting VM listing task for deployment ({})", deployment);
        let task: Task = get_json(
            &self.agent,
            &url,
            Some(&authorization),
            &[("format", "full")],
        )?;
        let task = self.wait_for_task(task)?;

        let authorization = self.authorization()?;
        let output = get_text(
            &self.agent,
            &join_url(&self.api_address, &format!("/tasks/{}/output", task.id)),
            Some(&authorization),
            &[("type", "result")],
        )?;

        parse_vm_output(&output)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum AuthScheme {
    Basic,
    Uaa(String),
}

fn auth_scheme(info: DirectorInfo, context: &str) -> SeekerResult<AuthScheme> {
    let auth = info.user_authentication;
    match (auth.kind.as_str(), auth.options) {
        ("basic", _) => Ok(AuthScheme::Basic),
        ("uaa", Some(options)) if !options.url.is_empty() => Ok(AuthScheme::Uaa(options.url)),
        (kind, _) => Err(SeekerError::BadResponse {
            context: context.to_string(),
            reason: format!("unsupported director authentication `{}`", kind),
        }),
    }
}

/// Parse the NDJSON result of a `vms?format=full` task
fn parse_vm_output(output: &str) -> SeekerResult<Vec<DeploymentVm>> {
    let mut vms = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let entry: VmEntry = serde_json::from_str(line).map_err(|e| SeekerError::BadResponse {
            context: "director task output".to_string(),
            reason: e.to_string(),
        })?;

        // VMs without a job are unassigned and cannot host app instances
        let Some(job_name) = entry.job_name else {
            continue;
        };

        vms.push(DeploymentVm {
            job_name,
            index: entry.index.unwrap_or(0),
            ips: entry.ips,
        });
    }
    Ok(vms)
}
