//! Identity resolution: names or GUIDs to an app and its running instances

use crate::clients::CloudController;
use crate::error::{LookupStage, SeekerError, SeekerResult};
use std::net::IpAddr;
use tracing::debug;

/// A resolved application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub guid: String,
    pub name: String,
}

/// One running instance of an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInstance {
    /// Instance index as reported by the stats endpoint
    pub index: u32,
    /// Canonical IP of the cell hosting the instance
    pub host: String,
    pub port: u16,
}

/// Parse an address and render it in normalized form.
///
/// IPv4-mapped IPv6 addresses collapse to plain IPv4 so both spellings
/// share one cache key.
pub fn canonicalize_ip(ip: &str) -> SeekerResult<String> {
    ip.trim()
        .parse::<IpAddr>()
        .map(|addr| addr.to_canonical().to_string())
        .map_err(|_| SeekerError::InvalidIp(ip.to_string()))
}

/// A GUID needs no resolution
pub fn by_guid(guid: &str) -> String {
    guid.to_string()
}

/// Resolve org, then space within the org, then app within the space
pub fn by_org_space_and_name(
    cf: &dyn CloudController,
    org: &str,
    space: &str,
    app: &str,
) -> SeekerResult<String> {
    debug!("Getting org by name ({}) from CF API", org);
    let org = cf
        .org_by_name(org)
        .map_err(|e| SeekerError::lookup(LookupStage::Org, e))?;

    debug!(
        "Getting space by name ({}) and org GUID ({}) from CF API",
        space, org.guid
    );
    let space = cf
        .space_by_name(space, &org.guid)
        .map_err(|e| SeekerError::lookup(LookupStage::Space, e))?;

    debug!(
        "Getting app by name ({}), space GUID ({}) and org GUID ({}) from CF API",
        app, space.guid, org.guid
    );
    let app = cf
        .app_by_name(app, &space.guid, &org.guid)
        .map_err(|e| SeekerError::lookup(LookupStage::App, e))?;

    Ok(app.guid)
}

/// Fetch the live instances of an app, ordered by instance index
pub fn find_instances(
    cf: &dyn CloudController,
    guid: &str,
) -> SeekerResult<(AppIdentity, Vec<AppInstance>)> {
    debug!("Getting application stats for app with GUID {} from CF API", guid);
    let stats = cf.app_stats(guid).map_err(|e| SeekerError::AppStats {
        guid: guid.to_string(),
        source: Box::new(e),
    })?;
    if stats.is_empty() {
        return Err(SeekerError::NoInstances(guid.to_string()));
    }

    let mut name = String::new();
    let mut instances = Vec::with_capacity(stats.len());
    for (key, stat) in &stats {
        let index = key.parse::<u32>().map_err(|_| SeekerError::BadResponse {
            context: format!("stats for app {}", guid),
            reason: format!("instance key `{}` is not a number", key),
        })?;
        instances.push(AppInstance {
            index,
            host: canonicalize_ip(&stat.host)?,
            port: stat.port,
        });
        if name.is_empty() {
            name = stat.name.clone();
        }
    }
    // Stats keys are strings, so "10" sorts before "2"
    instances.sort_by_key(|i| i.index);

    Ok((
        AppIdentity {
            guid: guid.to_string(),
            name,
        },
        instances,
    ))
}
