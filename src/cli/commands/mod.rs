//! CLI command implementations

pub mod config;
pub mod convert;
pub mod find;
pub mod info;
pub mod invalidate;
pub mod server;

pub use config::execute as config;
pub use convert::execute as convert;
pub use find::execute as find;
pub use info::execute as info;
pub use invalidate::execute as invalidate;
pub use server::execute as server;

use crate::config::Config;
use crate::error::{SeekerError, SeekerResult};
use crate::remote::RemoteClient;

/// Run a blocking API call without stalling the runtime
pub(crate) async fn blocking<T, F>(call: F) -> SeekerResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SeekerResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| SeekerError::Internal(format!("worker task failed: {}", e)))?
}

/// Client for `--target`, or the error naming the command that needed it
pub(crate) fn remote(
    command: &'static str,
    target: Option<&str>,
    config: &Config,
) -> SeekerResult<RemoteClient> {
    let target = target.ok_or(SeekerError::TargetRequired(command))?;
    Ok(RemoteClient::new(target, config.http_timeout(), false))
}
