//! Convert command - translate between names and GUIDs

use super::blocking;
use crate::cli::args::{ConvertArgs, ConvertTarget, OutputFormat};
use crate::cli::output;
use crate::config::Config;
use crate::error::SeekerResult;
use crate::remote::RemoteClient;
use crate::seeker::{ConvertRequest, Seeker};

/// Execute the convert command
pub async fn execute(
    args: ConvertArgs,
    config: &Config,
    target: Option<&str>,
    format: OutputFormat,
) -> SeekerResult<()> {
    let request = request_for(args.resource);

    let converted = match target {
        Some(target) => {
            let client = RemoteClient::new(target, config.http_timeout(), false);
            blocking(move || client.convert(&request))
                .await?
                .contents
        }
        None => {
            let config = config.clone();
            blocking(move || Seeker::new(&config)?.convert(&request)).await?
        }
    };

    output::print_convert(format, &converted)
}

fn request_for(resource: ConvertTarget) -> ConvertRequest {
    match resource {
        ConvertTarget::Guid { guid } => ConvertRequest::ByGuid(guid),
        ConvertTarget::Org { org } => ConvertRequest::ByOrg(org),
        ConvertTarget::Space { org, space } => ConvertRequest::BySpace { org, space },
        ConvertTarget::App { org, space, app } => ConvertRequest::ByApp { org, space, app },
    }
}
