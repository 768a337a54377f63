//! External API clients
//!
//! The seeker talks to two collaborators through the traits in this module:
//! - `CloudController`: the Cloud Foundry v2 API (orgs, spaces, apps, stats)
//! - `Director`: a BOSH director (VMs per deployment)
//!
//! Both are blocking. The HTTPS implementations live in `cf` and `bosh`.

pub mod bosh;
pub mod cf;
#[cfg(test)]
pub(crate) mod fakes;
pub(crate) mod http;
mod uaa;

pub use bosh::BoshClient;
pub use cf::CfClient;

use crate::error::SeekerResult;
use std::collections::BTreeMap;

/// A Cloud Foundry organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Org {
    pub guid: String,
    pub name: String,
}

/// A Cloud Foundry space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Space {
    pub guid: String,
    pub name: String,
    pub org_guid: String,
}

/// A Cloud Foundry application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub guid: String,
    pub name: String,
    pub space_guid: String,
}

/// Runtime information for one app instance, as reported by the stats endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceStats {
    pub name: String,
    pub host: String,
    pub port: u16,
}

/// One VM as reported by the director
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentVm {
    pub job_name: String,
    pub index: u32,
    pub ips: Vec<String>,
}

/// Cloud Foundry API operations used by the seeker
///
/// Implementations must be safe to call concurrently.
pub trait CloudController: Send + Sync {
    fn org_by_name(&self, name: &str) -> SeekerResult<Org>;

    fn space_by_name(&self, name: &str, org_guid: &str) -> SeekerResult<Space>;

    fn app_by_name(&self, name: &str, space_guid: &str, org_guid: &str) -> SeekerResult<App>;

    /// Instance stats keyed by instance index ("0", "1", ...)
    fn app_stats(&self, app_guid: &str) -> SeekerResult<BTreeMap<String, InstanceStats>>;

    fn org_by_guid(&self, guid: &str) -> SeekerResult<Org>;

    fn space_by_guid(&self, guid: &str) -> SeekerResult<Space>;

    fn app_by_guid(&self, guid: &str) -> SeekerResult<App>;
}

/// BOSH director operations used by the VM cache
pub trait Director: Send + Sync {
    /// Every VM in the named deployment, fetched in one call
    fn deployment_vms(&self, deployment: &str) -> SeekerResult<Vec<DeploymentVm>>;
}
