//! Find command - locate an app's instances

use super::blocking;
use crate::api::routes::NO_BOSH_WARNING;
use crate::cli::args::{FindArgs, OutputFormat};
use crate::cli::output;
use crate::config::Config;
use crate::error::SeekerResult;
use crate::remote::RemoteClient;
use crate::seeker::{FindRequest, Seeker};
use crate::ui::{self, UiContext};

/// Execute the find command
pub async fn execute(
    args: FindArgs,
    config: &Config,
    target: Option<&str>,
    format: OutputFormat,
) -> SeekerResult<()> {
    let request = FindRequest::from_parts(
        args.app_guid.as_deref(),
        args.org.as_deref(),
        args.space.as_deref(),
        args.app.as_deref(),
    )?;

    let (found, warning) = match target {
        Some(target) => {
            let client = RemoteClient::new(target, config.http_timeout(), false);
            let reply = blocking(move || client.find(&request)).await?;
            (reply.contents, reply.warning)
        }
        None => {
            let config = config.clone();
            blocking(move || {
                let seeker = Seeker::new(&config)?;
                let warning = (!seeker.bosh_configured()).then(|| NO_BOSH_WARNING.to_string());
                Ok((seeker.find(&request)?, warning))
            })
            .await?
        }
    };

    if let Some(warning) = warning {
        ui::step_warn(&UiContext::detect(), &warning);
    }
    output::print_find(format, &found)
}
