//! Invalidate command - wipe a server's VM cache

use super::{blocking, remote};
use crate::config::Config;
use crate::error::SeekerResult;
use crate::ui::{self, UiContext};

/// Execute the invalidate command
pub async fn execute(config: &Config, target: Option<&str>) -> SeekerResult<()> {
    let client = remote("invalidate", target, config)?;
    let message = blocking(move || client.invalidate()).await?;
    ui::step_ok(&UiContext::detect(), &message);
    Ok(())
}
