//! Configuration schema for cfseeker
//!
//! Configuration is stored at `~/.config/cfseeker/config.toml`

use crate::error::{SeekerError, SeekerResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timeout in seconds for every outbound HTTP request
    pub http_timeout_secs: u64,

    /// Cloud Foundry API settings
    pub cf: CfConfig,

    /// BOSH director settings
    pub bosh: BoshConfig,

    /// API server settings
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout_secs: 15,
            cf: CfConfig::default(),
            bosh: BoshConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Request timeout shared by the CF and BOSH clients
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Check the keys every command needs
    pub fn validate(&self) -> SeekerResult<()> {
        if self.cf.api_address.trim().is_empty() {
            return Err(SeekerError::ConfigMissing("cf.api_address"));
        }
        if self.server.port == 0 {
            return Err(SeekerError::ConfigMissing("server.port"));
        }
        Ok(())
    }

    /// Copy of the config with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.cf.client_secret.is_empty() {
            config.cf.client_secret = REDACTED.to_string();
        }
        if !config.bosh.password.is_empty() {
            config.bosh.password = REDACTED.to_string();
        }
        if !config.bosh.client_secret.is_empty() {
            config.bosh.client_secret = REDACTED.to_string();
        }
        config
    }
}

const REDACTED: &str = "<redacted>";

/// Location and UAA client credentials for a Cloud Foundry API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CfConfig {
    /// API URL, e.g. https://api.sys.example.com
    pub api_address: String,

    /// UAA client with `cloud_controller.admin_read_only` or equivalent
    pub client_id: String,

    pub client_secret: String,

    pub skip_ssl_validation: bool,
}

/// Location, credentials and tracked deployments for a BOSH director
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoshConfig {
    /// Director URL, e.g. https://10.0.0.6:25555
    pub api_address: String,

    /// Director user, for Basic auth or a UAA login
    pub username: String,

    pub password: String,

    /// UAA client used instead of the user login when set
    pub client_id: String,

    pub client_secret: String,

    pub skip_ssl_validation: bool,

    /// Deployments to search, in the order they are scanned
    pub deployments: Vec<String>,

    /// Delay between polls of a running director task
    pub task_poll_interval_ms: u64,

    /// Give up on a director task after this many seconds
    pub task_timeout_secs: u64,
}

impl Default for BoshConfig {
    fn default() -> Self {
        Self {
            api_address: String::new(),
            username: String::new(),
            password: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            skip_ssl_validation: false,
            deployments: vec![],
            task_poll_interval_ms: 500,
            task_timeout_secs: 300,
        }
    }
}

impl BoshConfig {
    /// Whether VM enrichment through the director is enabled
    pub fn is_configured(&self) -> bool {
        let user = !self.username.is_empty() && !self.password.is_empty();
        !self.api_address.trim().is_empty()
            && (user || !self.client_id.is_empty())
            && !self.deployments.is_empty()
    }

    pub fn task_poll_interval(&self) -> Duration {
        Duration::from_millis(self.task_poll_interval_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    pub port: u16,

    /// Seconds before a cached deployment goes stale (negative = never)
    pub cache_ttl_secs: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cache_ttl_secs: 15 * 60,
        }
    }
}

impl ServerConfig {
    /// Cache staleness window; a negative delta never expires.
    ///
    /// Values too large for a time delta also never expire.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.cache_ttl_secs)
            .unwrap_or_else(|| chrono::Duration::seconds(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[cf]"));
        assert!(toml.contains("[bosh]"));
        assert!(toml.contains("[server]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.http_timeout_secs, 15);
        assert_eq!(config.server.cache_ttl_secs, 900);
        assert!(!config.bosh.is_configured());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [bosh]
            api_address = "https://10.0.0.6:25555"
            username = "cfseeker"
            password = "secret"
            deployments = ["cf", "isolation-segment"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.bosh.is_configured());
        assert_eq!(config.bosh.deployments, vec!["cf", "isolation-segment"]);
        assert_eq!(config.bosh.task_poll_interval_ms, 500); // default preserved
    }

    #[test]
    fn bosh_needs_deployments() {
        let bosh = BoshConfig {
            api_address: "https://10.0.0.6:25555".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            ..BoshConfig::default()
        };
        assert!(!bosh.is_configured());
    }

    #[test]
    fn bosh_client_stands_in_for_user() {
        let bosh = BoshConfig {
            api_address: "https://10.0.0.6:25555".to_string(),
            client_id: "cfseeker".to_string(),
            deployments: vec!["cf".to_string()],
            ..BoshConfig::default()
        };
        assert!(bosh.is_configured());
    }

    #[test]
    fn validate_requires_cf_address() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(SeekerError::ConfigMissing("cf.api_address"))
        ));
    }

    #[test]
    fn negative_ttl_is_preserved() {
        let server: ServerConfig = toml::from_str("cache_ttl_secs = -1").unwrap();
        assert!(server.cache_ttl() < chrono::Duration::zero());
    }

    #[test]
    fn out_of_range_ttl_never_expires() {
        let server: ServerConfig =
            toml::from_str("cache_ttl_secs = 9223372036854775807").unwrap();
        assert!(server.cache_ttl() < chrono::Duration::zero());

        let server: ServerConfig =
            toml::from_str("cache_ttl_secs = -9223372036854775807").unwrap();
        assert!(server.cache_ttl() < chrono::Duration::zero());
    }

    #[test]
    fn redacted_masks_secrets() {
        let mut config = Config::default();
        config.cf.client_secret = "hunter2".to_string();
        let shown = config.redacted();
        assert_eq!(shown.cf.client_secret, "<redacted>");
        assert!(shown.bosh.password.is_empty());
    }
}
