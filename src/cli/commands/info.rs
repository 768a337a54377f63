//! Info command - show a server's version and BOSH status

use super::{blocking, remote};
use crate::cli::args::OutputFormat;
use crate::cli::output;
use crate::config::Config;
use crate::error::SeekerResult;

/// Execute the info command
pub async fn execute(
    config: &Config,
    target: Option<&str>,
    format: OutputFormat,
) -> SeekerResult<()> {
    let client = remote("info", target, config)?;
    let reply = blocking(move || client.info()).await?;
    output::print_info(format, target.unwrap_or_default(), &reply.contents)
}
