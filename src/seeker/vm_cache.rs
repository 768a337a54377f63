//! IP to VM cache, populated lazily one deployment at a time
//!
//! Each deployment is cached as a unit: its IP map and fetch time live in a
//! single entry, so a deployment is either fully present or absent. Staleness
//! is computed on read; nothing expires in the background.
//!
//! A miss walks the configured deployments in order, fetching only those not
//! already cached and stopping at the first one that holds the IP. If the IP
//! is still unknown, the whole cache is dropped and every deployment is
//! scanned once more. That second answer is final.

use super::output::CachedDeployment;
use super::resolver::canonicalize_ip;
use crate::clients::{DeploymentVm, Director};
use crate::error::{SeekerError, SeekerResult};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// A VM managed by the director
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmInfo {
    pub job_name: String,
    pub deployment: String,
    pub ip: String,
    pub index: u32,
}

impl VmInfo {
    /// `job/index`, the way the director names instances
    pub fn vm_name(&self) -> String {
        format!("{}/{}", self.job_name, self.index)
    }
}

#[derive(Debug)]
struct DeploymentEntry {
    vms: HashMap<String, VmInfo>,
    cached_at: DateTime<Utc>,
}

impl DeploymentEntry {
    /// Build a complete entry; any unparseable IP rejects the whole deployment
    fn build(deployment: &str, vms: Vec<DeploymentVm>, now: DateTime<Utc>) -> SeekerResult<Self> {
        let mut map = HashMap::new();
        for vm in vms {
            for ip in &vm.ips {
                let ip = canonicalize_ip(ip)?;
                map.insert(
                    ip.clone(),
                    VmInfo {
                        job_name: vm.job_name.clone(),
                        deployment: deployment.to_string(),
                        ip,
                        index: vm.index,
                    },
                );
            }
        }
        Ok(Self {
            vms: map,
            cached_at: now,
        })
    }
}

/// Per-deployment VM cache with a shared TTL. A negative TTL never expires.
#[derive(Debug)]
pub struct VmCache {
    deployments: HashMap<String, DeploymentEntry>,
    ttl: Duration,
}

impl VmCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            deployments: HashMap::new(),
            ttl,
        }
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    fn is_fresh(&self, entry: &DeploymentEntry, now: DateTime<Utc>) -> bool {
        self.ttl < Duration::zero() || now - entry.cached_at < self.ttl
    }

    /// Find the VM hosting `ip`, fetching from the director as needed.
    ///
    /// `order` is the configured deployment list. Returns `Ok(None)` when no
    /// configured deployment has a VM with this IP.
    pub fn lookup(
        &mut self,
        ip: &str,
        director: &dyn Director,
        order: &[String],
    ) -> SeekerResult<Option<VmInfo>> {
        let ip = canonicalize_ip(ip)?;
        let now = Utc::now();

        if let Some(owner) = self.owner_of(&ip, order) {
            let fresh = self
                .deployments
                .get(&owner)
                .is_some_and(|entry| self.is_fresh(entry, now));
            if fresh {
                debug!("VM cache hit for {} in deployment {}", ip, owner);
                return Ok(self.cached_vm(&owner, &ip));
            }
            debug!("Deployment {} is stale, evicting", owner);
            self.invalidate_deployment(&owner);
        }

        debug!("VM cache miss for {}, scanning uncached deployments", ip);
        if let Some(vm) = self.scan(&ip, director, order)? {
            return Ok(Some(vm));
        }

        debug!("{} not found in incremental scan, rescanning all deployments", ip);
        self.invalidate_all();
        self.scan(&ip, director, order)
    }

    /// Fetch each uncached deployment in order until one holds `ip`
    fn scan(
        &mut self,
        ip: &str,
        director: &dyn Director,
        order: &[String],
    ) -> SeekerResult<Option<VmInfo>> {
        for deployment in order {
            if self.deployments.contains_key(deployment) {
                continue;
            }

            debug!("Fetching VMs for deployment {}", deployment);
            let vms = director
                .deployment_vms(deployment)
                .map_err(|e| SeekerError::DeploymentFetch {
                    deployment: deployment.clone(),
                    source: Box::new(e),
                })?;
            let entry = DeploymentEntry::build(deployment, vms, Utc::now())?;
            debug!("Cached {} IPs for deployment {}", entry.vms.len(), deployment);

            let found = entry.vms.get(ip).cloned();
            self.deployments.insert(deployment.clone(), entry);
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    fn owner_of(&self, ip: &str, order: &[String]) -> Option<String> {
        order
            .iter()
            .find(|d| {
                self.deployments
                    .get(d.as_str())
                    .is_some_and(|entry| entry.vms.contains_key(ip))
            })
            .cloned()
    }

    fn cached_vm(&self, deployment: &str, ip: &str) -> Option<VmInfo> {
        self.deployments
            .get(deployment)
            .and_then(|entry| entry.vms.get(ip))
            .cloned()
    }

    /// Drop every cached deployment
    pub fn invalidate_all(&mut self) {
        if !self.deployments.is_empty() {
            info!("Invalidating VM cache ({} deployments)", self.deployments.len());
        }
        self.deployments.clear();
    }

    /// Drop one deployment and every IP it contributed
    pub fn invalidate_deployment(&mut self, deployment: &str) {
        self.deployments.remove(deployment);
    }

    #[cfg(test)]
    pub fn is_cached(&self, deployment: &str) -> bool {
        self.deployments.contains_key(deployment)
    }

    /// Cached deployments sorted by name
    pub fn status(&self) -> Vec<CachedDeployment> {
        let now = Utc::now();
        let mut status: Vec<CachedDeployment> = self
            .deployments
            .iter()
            .map(|(name, entry)| CachedDeployment {
                name: name.clone(),
                hosts: entry.vms.len(),
                cached_at: entry.cached_at,
                stale: !self.is_fresh(entry, now),
            })
            .collect();
        status.sort_by(|a, b| a.name.cmp(&b.name));
        status
    }

    #[cfg(test)]
    fn ips(&self) -> Vec<String> {
        let mut ips: Vec<String> = self
            .deployments
            .values()
            .flat_map(|entry| entry.vms.keys().cloned())
            .collect();
        ips.sort();
        ips
    }
}
