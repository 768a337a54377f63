//! Server command - run the HTTP API

use crate::api::ApiServer;
use crate::cli::args::ServerArgs;
use crate::config::Config;
use crate::error::{SeekerError, SeekerResult};
use crate::seeker::Seeker;
use std::sync::Arc;
use tracing::info;

/// Execute the server command
pub async fn execute(args: ServerArgs, config: &Config) -> SeekerResult<()> {
    config.validate()?;

    let port = if args.cf {
        cf_port(std::env::var("PORT").ok())?
    } else {
        config.server.port
    };

    let seeker = Seeker::new(config)?;
    if config.server.cache_ttl_secs < 0 {
        info!("VM cache entries never expire");
    } else {
        info!("VM cache TTL is {}s", config.server.cache_ttl_secs);
    }

    ApiServer::new(Arc::new(seeker), config.server.host.clone(), port)
        .start()
        .await
}

/// Port assigned by the Cloud Foundry platform
fn cf_port(value: Option<String>) -> SeekerResult<u16> {
    let value = value.ok_or_else(|| {
        SeekerError::input("--cf requires the PORT environment variable to be set")
    })?;
    value
        .trim()
        .parse()
        .map_err(|_| SeekerError::input(format!("PORT `{}` is not a valid port number", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cf_port_parses_env_value() {
        assert_eq!(cf_port(Some("8080".to_string())).unwrap(), 8080);
    }

    #[test]
    fn cf_port_requires_value() {
        let err = cf_port(None).unwrap_err();
        assert!(err.is_input_error());
        assert!(cf_port(Some("http".to_string())).is_err());
    }
}
