//! Cloud Foundry v2 API client

use super::http::{bearer, build_agent, get_json, join_url};
use super::uaa::{Grant, TokenSource};
use super::{App, CloudController, InstanceStats, Org, Space};
use crate::config::CfConfig;
use crate::error::{SeekerError, SeekerResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

#[derive(Deserialize)]
struct CfInfo {
    token_endpoint: String,
}

#[derive(Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Deserialize)]
struct Resource<E> {
    metadata: Metadata,
    entity: E,
}

#[derive(Deserialize)]
struct ResourceList<E> {
    #[serde(default = "Vec::new")]
    resources: Vec<Resource<E>>,
}

#[derive(Deserialize)]
struct OrgEntity {
    name: String,
}

#[derive(Deserialize)]
struct SpaceEntity {
    name: String,
    organization_guid: String,
}

#[derive(Deserialize)]
struct AppEntity {
    name: String,
    space_guid: String,
}

#[derive(Deserialize)]
struct StatsEntry {
    #[serde(default)]
    stats: Option<StatsDetail>,
}

#[derive(Deserialize)]
struct StatsDetail {
    #[serde(default)]
    name: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    port: u16,
}

impl From<Resource<OrgEntity>> for Org {
    fn from(r: Resource<OrgEntity>) -> Self {
        Org {
            guid: r.metadata.guid,
            name: r.entity.name,
        }
    }
}

impl From<Resource<SpaceEntity>> for Space {
    fn from(r: Resource<SpaceEntity>) -> Self {
        Space {
            guid: r.metadata.guid,
            name: r.entity.name,
            org_guid: r.entity.organization_guid,
        }
    }
}

impl From<Resource<AppEntity>> for App {
    fn from(r: Resource<AppEntity>) -> Self {
        App {
            guid: r.metadata.guid,
            name: r.entity.name,
            space_guid: r.entity.space_guid,
        }
    }
}

/// Blocking client for the Cloud Controller v2 API
pub struct CfClient {
    agent: Agent,
    api_address: String,
    client_id: String,
    client_secret: String,
    uaa: OnceLock<TokenSource>,
}

impl CfClient {
    /// Create a client; nothing is contacted until the first lookup
    pub fn new(config: &CfConfig, timeout: Duration) -> SeekerResult<Self> {
        if config.api_address.trim().is_empty() {
            return Err(SeekerError::ConfigMissing("cf.api_address"));
        }
        if config.client_id.is_empty() {
            return Err(SeekerError::ConfigMissing("cf.client_id"));
        }

        Ok(Self {
            agent: build_agent(timeout, config.skip_ssl_validation),
            api_address: config.api_address.trim().to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            uaa: OnceLock::new(),
        })
    }

    fn token(&self) -> SeekerResult<String> {
        if let Some(source) = self.uaa.get() {
            return source.token(&self.agent);
        }

        let url = join_url(&self.api_address, "/v2/info");
        debug!("Discovering UAA endpoint from {}", url);
        let info: CfInfo = get_json(&self.agent, &url, None, &[])?;
        // A concurrent caller may have won the race; either source is equivalent.
        let _ = self.uaa.set(TokenSource::new(
            &info.token_endpoint,
            Grant::ClientCredentials {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
            },
        ));

        self.uaa
            .get()
            .ok_or_else(|| SeekerError::Internal("UAA token source not initialised".to_string()))?
            .token(&self.agent)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> SeekerResult<T> {
        let token = self.token()?;
        get_json(
            &self.agent,
            &join_url(&self.api_address, path),
            Some(&bearer(&token)),
            query,
        )
    }

    fn first<E>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        kind: &'static str,
        name: &str,
    ) -> SeekerResult<Resource<E>>
    where
        E: DeserializeOwned,
    {
        let list: ResourceList<E> = self.get(path, query)?;
        list.resources
            .into_iter()
            .next()
            .ok_or_else(|| SeekerError::not_found(kind, name))
    }
}

impl CloudController for CfClient {
    fn org_by_name(&self, name: &str) -> SeekerResult<Org> {
        let filter = format!("name:{}", name);
        self.first::<OrgEntity>("/v2/organizations", &[("q", filter.as_str())], "org", name)
            .map(Org::from)
    }

    fn space_by_name(&self, name: &str, org_guid: &str) -> SeekerResult<Space> {
        let by_name = format!("name:{}", name);
        let by_org = format!("organization_guid:{}", org_guid);
        self.first::<SpaceEntity>(
            "/v2/spaces",
            &[("q", by_name.as_str()), ("q", by_org.as_str())],
            "space",
            name,
        )
        .map(Space::from)
    }

    fn app_by_name(&self, name: &str, space_guid: &str, org_guid: &str) -> SeekerResult<App> {
        let by_space = format!("space_guid:{}", space_guid);
        let by_name = format!("name:{}", name);
        let app = self
            .first::<AppEntity>(
                "/v2/apps",
                &[("q", by_space.as_str()), ("q", by_name.as_str())],
                "app",
                name,
            )
            .map(App::from)?;
        debug!("Found app {} in space {} (org {})", app.guid, space_guid, org_guid);
        Ok(app)
    }

    fn app_stats(&self, app_guid: &str) -> SeekerResult<BTreeMap<String, InstanceStats>> {
        let raw: BTreeMap<String, StatsEntry> =
            self.get(&format!("/v2/apps/{}/stats", app_guid), &[])?;
        Ok(raw
            .into_iter()
            .map(|(index, entry)| {
                let detail = entry.stats.unwrap_or(StatsDetail {
                    name: String::new(),
                    host: String::new(),
                    port: 0,
                });
                (
                    index,
                    InstanceStats {
                        name: detail.name,
                        host: detail.host,
                        port: detail.port,
                    },
                )
            })
            .collect())
    }

    fn org_by_guid(&self, guid: &str) -> SeekerResult<Org> {
        self.get::<Resource<OrgEntity>>(&format!("/v2/organizations/{}", guid), &[])
            .map(Org::from)
    }

    fn space_by_guid(&self, guid: &str) -> SeekerResult<Space> {
        self.get::<Resource<SpaceEntity>>(&format!("/v2/spaces/{}", guid), &[])
            .map(Space::from)
    }

    fn app_by_guid(&self, guid: &str) -> SeekerResult<App> {
        self.get::<Resource<AppEntity>>(&format!("/v2/apps/{}", guid), &[])
            .map(App::from)
    }
}
