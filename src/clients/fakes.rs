//! In-memory `CloudController` and `Director` implementations for tests

use super::{App, CloudController, DeploymentVm, Director, InstanceStats, Org, Space};
use crate::error::{SeekerError, SeekerResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Cloud Controller backed by maps, recording every call it receives
#[derive(Default)]
pub(crate) struct FakeCloudController {
    pub orgs: Vec<Org>,
    pub spaces: Vec<Space>,
    pub apps: Vec<App>,
    pub stats: HashMap<String, BTreeMap<String, InstanceStats>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCloudController {
    /// One org `acme` / space `prod` / app `web` with two running instances
    pub fn with_web_app() -> Self {
        let mut fake = Self::default();
        fake.orgs.push(org("org-1", "acme"));
        fake.spaces.push(space("space-1", "prod", "org-1"));
        fake.apps.push(app("app-1", "web", "space-1"));
        fake.stats.insert(
            "app-1".to_string(),
            BTreeMap::from([
                ("0".to_string(), running("web", "10.0.16.5", 61000)),
                ("1".to_string(), running("web", "10.0.16.6", 61001)),
            ]),
        );
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub(crate) fn org(guid: &str, name: &str) -> Org {
    Org {
        guid: guid.to_string(),
        name: name.to_string(),
    }
}

pub(crate) fn space(guid: &str, name: &str, org_guid: &str) -> Space {
    Space {
        guid: guid.to_string(),
        name: name.to_string(),
        org_guid: org_guid.to_string(),
    }
}

pub(crate) fn app(guid: &str, name: &str, space_guid: &str) -> App {
    App {
        guid: guid.to_string(),
        name: name.to_string(),
        space_guid: space_guid.to_string(),
    }
}

pub(crate) fn running(name: &str, host: &str, port: u16) -> InstanceStats {
    InstanceStats {
        name: name.to_string(),
        host: host.to_string(),
        port,
    }
}

fn missing(kind: &'static str, key: &str) -> SeekerError {
    SeekerError::HttpStatus {
        context: format!("GET /v2/{}s/{}", kind, key),
        status: 404,
        body: "CF-ResourceNotFound".to_string(),
    }
}

impl CloudController for FakeCloudController {
    fn org_by_name(&self, name: &str) -> SeekerResult<Org> {
        self.record(format!("org_by_name:{}", name));
        self.orgs
            .iter()
            .find(|o| o.name == name)
            .cloned()
            .ok_or_else(|| SeekerError::not_found("org", name))
    }

    fn space_by_name(&self, name: &str, org_guid: &str) -> SeekerResult<Space> {
        self.record(format!("space_by_name:{}:{}", name, org_guid));
        self.spaces
            .iter()
            .find(|s| s.name == name && s.org_guid == org_guid)
            .cloned()
            .ok_or_else(|| SeekerError::not_found("space", name))
    }

    fn app_by_name(&self, name: &str, space_guid: &str, _org_guid: &str) -> SeekerResult<App> {
        self.record(format!("app_by_name:{}:{}", name, space_guid));
        self.apps
            .iter()
            .find(|a| a.name == name && a.space_guid == space_guid)
            .cloned()
            .ok_or_else(|| SeekerError::not_found("app", name))
    }

    fn app_stats(&self, app_guid: &str) -> SeekerResult<BTreeMap<String, InstanceStats>> {
        self.record(format!("app_stats:{}", app_guid));
        self.stats
            .get(app_guid)
            .cloned()
            .ok_or_else(|| missing("app", app_guid))
    }

    fn org_by_guid(&self, guid: &str) -> SeekerResult<Org> {
        self.record(format!("org_by_guid:{}", guid));
        self.orgs
            .iter()
            .find(|o| o.guid == guid)
            .cloned()
            .ok_or_else(|| missing("organization", guid))
    }

    fn space_by_guid(&self, guid: &str) -> SeekerResult<Space> {
        self.record(format!("space_by_guid:{}", guid));
        self.spaces
            .iter()
            .find(|s| s.guid == guid)
            .cloned()
            .ok_or_else(|| missing("space", guid))
    }

    fn app_by_guid(&self, guid: &str) -> SeekerResult<App> {
        self.record(format!("app_by_guid:{}", guid));
        self.apps
            .iter()
            .find(|a| a.guid == guid)
            .cloned()
            .ok_or_else(|| missing("app", guid))
    }
}

/// Director serving fixed deployments and counting fetches per deployment
#[derive(Default)]
pub(crate) struct FakeDirector {
    pub deployments: HashMap<String, Vec<DeploymentVm>>,
    pub failing: Vec<String>,
    pub fetches: Mutex<Vec<String>>,
}

impl FakeDirector {
    pub fn with_deployment(mut self, name: &str, vms: Vec<DeploymentVm>) -> Self {
        self.deployments.insert(name.to_string(), vms);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    /// Deployment names in the order they were fetched
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, deployment: &str) -> usize {
        self.fetches().iter().filter(|d| *d == deployment).count()
    }

    pub fn reset_fetches(&self) {
        self.fetches.lock().unwrap().clear();
    }
}

pub(crate) fn vm(job_name: &str, index: u32, ips: &[&str]) -> DeploymentVm {
    DeploymentVm {
        job_name: job_name.to_string(),
        index,
        ips: ips.iter().map(|ip| ip.to_string()).collect(),
    }
}

impl Director for FakeDirector {
    fn deployment_vms(&self, deployment: &str) -> SeekerResult<Vec<DeploymentVm>> {
        self.fetches.lock().unwrap().push(deployment.to_string());
        if self.failing.iter().any(|d| d == deployment) {
            return Err(SeekerError::HttpStatus {
                context: format!("GET /deployments/{}/vms", deployment),
                status: 500,
                body: "director unavailable".to_string(),
            });
        }
        Ok(self.deployments.get(deployment).cloned().unwrap_or_default())
    }
}
