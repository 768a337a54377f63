//! Locating Cloud Foundry apps
//!
//! `Seeker` is the single entry point: it resolves apps through the Cloud
//! Controller and, when a BOSH director is configured, maps each instance's
//! host IP to the VM running it through a shared [`VmCache`].

pub mod output;
pub mod request;
pub mod resolver;
pub mod vm_cache;

pub use output::{CachedDeployment, ConvertOutput, ConvertType, FindInstance, FindOutput};
pub use request::{ConvertRequest, FindRequest};
pub use resolver::{canonicalize_ip, AppIdentity, AppInstance};
pub use vm_cache::{VmCache, VmInfo};

use crate::clients::{BoshClient, CfClient, CloudController, Director, Org};
use crate::config::{Config, ServerConfig};
use crate::error::{LookupStage, SeekerError, SeekerResult};
use chrono::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

struct BoshBackend {
    director: Arc<dyn Director>,
    deployments: Vec<String>,
}

/// App locator holding its API clients and VM cache
pub struct Seeker {
    cf: Arc<dyn CloudController>,
    bosh: Option<BoshBackend>,
    cache: Mutex<VmCache>,
}

impl Seeker {
    /// Build HTTPS clients from configuration.
    ///
    /// BOSH enrichment is enabled only when `[bosh]` is fully configured.
    pub fn new(config: &Config) -> SeekerResult<Self> {
        let timeout = config.http_timeout();
        let cf: Arc<dyn CloudController> = Arc::new(CfClient::new(&config.cf, timeout)?);

        let director: Option<Arc<dyn Director>> = if config.bosh.is_configured() {
            Some(Arc::new(BoshClient::new(&config.bosh, timeout)?))
        } else {
            debug!("BOSH is not configured; instances will not be mapped to VMs");
            None
        };

        let seeker = Self::with_clients(cf, director, config.bosh.deployments.clone());
        seeker.set_ttl(config.server.cache_ttl());
        Ok(seeker)
    }

    /// Build a seeker around existing clients
    pub fn with_clients(
        cf: Arc<dyn CloudController>,
        director: Option<Arc<dyn Director>>,
        deployments: Vec<String>,
    ) -> Self {
        let bosh = director
            .filter(|_| !deployments.is_empty())
            .map(|director| BoshBackend {
                director,
                deployments,
            });

        Self {
            cf,
            bosh,
            cache: Mutex::new(VmCache::new(ServerConfig::default().cache_ttl())),
        }
    }

    fn cache(&self) -> MutexGuard<'_, VmCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether instances are enriched with VM identity
    pub fn bosh_configured(&self) -> bool {
        self.bosh.is_some()
    }

    /// Set how long a fetched deployment stays fresh; negative never expires
    pub fn set_ttl(&self, ttl: Duration) {
        self.cache().set_ttl(ttl);
    }

    /// Drop every cached deployment so the next lookup refetches
    pub fn invalidate_all(&self) {
        self.cache().invalidate_all();
    }

    /// Deployments currently in the VM cache
    pub fn cache_status(&self) -> Vec<CachedDeployment> {
        self.cache().status()
    }

    /// Look up the VM with the given IP through the cache
    pub fn vm_with_ip(&self, ip: &str) -> SeekerResult<Option<VmInfo>> {
        let bosh = self
            .bosh
            .as_ref()
            .ok_or(SeekerError::ConfigMissing("bosh.deployments"))?;
        self.cache()
            .lookup(ip, bosh.director.as_ref(), &bosh.deployments)
    }

    /// Locate every running instance of an app
    pub fn find(&self, request: &FindRequest) -> SeekerResult<FindOutput> {
        let guid = match request {
            FindRequest::ByGuid(guid) => resolver::by_guid(guid),
            FindRequest::ByName { org, space, app } => {
                resolver::by_org_space_and_name(self.cf.as_ref(), org, space, app)?
            }
        };

        let (identity, instances) = resolver::find_instances(self.cf.as_ref(), &guid)?;

        let instances = match &self.bosh {
            Some(bosh) => {
                let mut cache = self.cache();
                instances
                    .into_iter()
                    .map(|instance| -> SeekerResult<FindInstance> {
                        let vm = cache
                            .lookup(&instance.host, bosh.director.as_ref(), &bosh.deployments)?
                            .ok_or_else(|| SeekerError::VmNotFound(instance.host.clone()))?;
                        Ok(FindInstance {
                            number: instance.index,
                            vm_name: Some(vm.vm_name()),
                            deployment: Some(vm.deployment),
                            host: instance.host,
                            port: instance.port,
                        })
                    })
                    .collect::<SeekerResult<Vec<_>>>()?
            }
            None => instances
                .into_iter()
                .map(|instance| FindInstance {
                    number: instance.index,
                    vm_name: None,
                    deployment: None,
                    host: instance.host,
                    port: instance.port,
                })
                .collect(),
        };

        Ok(FindOutput {
            guid: identity.guid,
            name: identity.name,
            count: instances.len(),
            instances,
        })
    }

    /// Translate between names and GUIDs for orgs, spaces and apps
    pub fn convert(&self, request: &ConvertRequest) -> SeekerResult<ConvertOutput> {
        match request {
            ConvertRequest::ByGuid(guid) => self.convert_guid(guid),
            ConvertRequest::ByOrg(org) => {
                let org = self.org_by_name(org)?;
                Ok(ConvertOutput {
                    org_guid: org.guid,
                    org_name: org.name,
                    space_guid: None,
                    space_name: None,
                    app_guid: None,
                    app_name: None,
                    kind: ConvertType::Org,
                })
            }
            ConvertRequest::BySpace { org, space } => {
                let org = self.org_by_name(org)?;
                let space = self
                    .cf
                    .space_by_name(space, &org.guid)
                    .map_err(|e| SeekerError::lookup(LookupStage::Space, e))?;
                Ok(ConvertOutput {
                    org_guid: org.guid,
                    org_name: org.name,
                    space_guid: Some(space.guid),
                    space_name: Some(space.name),
                    app_guid: None,
                    app_name: None,
                    kind: ConvertType::Space,
                })
            }
            ConvertRequest::ByApp { org, space, app } => {
                let org = self.org_by_name(org)?;
                let space = self
                    .cf
                    .space_by_name(space, &org.guid)
                    .map_err(|e| SeekerError::lookup(LookupStage::Space, e))?;
                let app = self
                    .cf
                    .app_by_name(app, &space.guid, &org.guid)
                    .map_err(|e| SeekerError::lookup(LookupStage::App, e))?;
                Ok(ConvertOutput {
                    org_guid: org.guid,
                    org_name: org.name,
                    space_guid: Some(space.guid),
                    space_name: Some(space.name),
                    app_guid: Some(app.guid),
                    app_name: Some(app.name),
                    kind: ConvertType::App,
                })
            }
        }
    }

    fn org_by_name(&self, name: &str) -> SeekerResult<Org> {
        self.cf
            .org_by_name(name)
            .map_err(|e| SeekerError::lookup(LookupStage::Org, e))
    }

    /// GUIDs are untyped: try app, then space, then org.
    ///
    /// A kind whose parent lookup fails counts as a miss for that kind.
    fn convert_guid(&self, guid: &str) -> SeekerResult<ConvertOutput> {
        self.convert_app_guid(guid)
            .or_else(|e| {
                debug!("GUID {} is not an app: {}", guid, e);
                self.convert_space_guid(guid)
            })
            .or_else(|e| {
                debug!("GUID {} is not a space: {}", guid, e);
                self.convert_org_guid(guid)
            })
            .map_err(|e| {
                debug!("GUID {} is not an org: {}", guid, e);
                SeekerError::GuidNotFound(guid.to_string())
            })
    }

    fn convert_app_guid(&self, guid: &str) -> SeekerResult<ConvertOutput> {
        let app = self.cf.app_by_guid(guid)?;
        let space = self.cf.space_by_guid(&app.space_guid)?;
        let org = self.cf.org_by_guid(&space.org_guid)?;
        Ok(ConvertOutput {
            org_guid: org.guid,
            org_name: org.name,
            space_guid: Some(space.guid),
            space_name: Some(space.name),
            app_guid: Some(app.guid),
            app_name: Some(app.name),
            kind: ConvertType::App,
        })
    }

    fn convert_space_guid(&self, guid: &str) -> SeekerResult<ConvertOutput> {
        let space = self.cf.space_by_guid(guid)?;
        let org = self.cf.org_by_guid(&space.org_guid)?;
        Ok(ConvertOutput {
            org_guid: org.guid,
            org_name: org.name,
            space_guid: Some(space.guid),
            space_name: Some(space.name),
            app_guid: None,
            app_name: None,
            kind: ConvertType::Space,
        })
    }

    fn convert_org_guid(&self, guid: &str) -> SeekerResult<ConvertOutput> {
        let org = self.cf.org_by_guid(guid)?;
        Ok(ConvertOutput {
            org_guid: org.guid,
            org_name: org.name,
            space_guid: None,
            space_name: None,
            app_guid: None,
            app_name: None,
            kind: ConvertType::Org,
        })
    }
}
