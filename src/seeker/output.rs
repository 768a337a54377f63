//! Result types returned by the seeker and serialized by the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an app's instances are running
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOutput {
    pub guid: String,
    pub name: String,
    pub instances: Vec<FindInstance>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindInstance {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    pub host: String,
    pub port: u16,
}

/// Which resource a converted GUID turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvertType {
    Org,
    Space,
    App,
}

impl fmt::Display for ConvertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertType::Org => write!(f, "org"),
            ConvertType::Space => write!(f, "space"),
            ConvertType::App => write!(f, "app"),
        }
    }
}

/// Names and GUIDs of a resource and its parents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOutput {
    pub org_guid: String,
    pub org_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ConvertType,
}

/// One deployment currently held in the VM cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDeployment {
    pub name: String,
    pub hosts: usize,
    pub cached_at: DateTime<Utc>,
    pub stale: bool,
}
