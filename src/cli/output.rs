//! Rendering of command results in the selected output format

use crate::api::ServerInfo;
use crate::cli::args::OutputFormat;
use crate::error::SeekerResult;
use crate::seeker::{ConvertOutput, FindOutput};
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

const DASH: &str = "-";

pub fn print_json<T: Serialize>(value: &T) -> SeekerResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_find(format: OutputFormat, output: &FindOutput) -> SeekerResult<()> {
    match format {
        OutputFormat::Json => print_json(output)?,
        OutputFormat::Plain => print!("{}", find_plain(output)),
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::intro(&ctx, &format!("{} ({})", output.name, output.guid));
            println!(
                "{:<6} {:<40} {:<7} {:<28} {}",
                style("#").bold(),
                style("HOST").bold(),
                style("PORT").bold(),
                style("VM").bold(),
                style("DEPLOYMENT").bold()
            );
            println!("{}", "-".repeat(96));
            print!("{}", find_rows(output));
            println!();
            println!("{} instance(s)", output.count);
        }
    }
    Ok(())
}

fn find_rows(output: &FindOutput) -> String {
    output
        .instances
        .iter()
        .map(|i| {
            format!(
                "{:<6} {:<40} {:<7} {:<28} {}\n",
                i.number,
                i.host,
                i.port,
                i.vm_name.as_deref().unwrap_or(DASH),
                i.deployment.as_deref().unwrap_or(DASH)
            )
        })
        .collect()
}

fn find_plain(output: &FindOutput) -> String {
    output
        .instances
        .iter()
        .map(|i| {
            format!(
                "{}\t{}\t{}\t{}\t{}\n",
                i.number,
                i.host,
                i.port,
                i.vm_name.as_deref().unwrap_or(DASH),
                i.deployment.as_deref().unwrap_or(DASH)
            )
        })
        .collect()
}

pub fn print_convert(format: OutputFormat, output: &ConvertOutput) -> SeekerResult<()> {
    match format {
        OutputFormat::Json => print_json(output)?,
        OutputFormat::Plain => println!("{}", convert_plain(output)),
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::intro(&ctx, &format!("Resolved {}", output.kind));
            for (key, value) in convert_fields(output) {
                ui::key_value(&ctx, key, value);
            }
        }
    }
    Ok(())
}

fn convert_fields(output: &ConvertOutput) -> Vec<(&'static str, &str)> {
    let mut fields = vec![
        ("org name", output.org_name.as_str()),
        ("org guid", output.org_guid.as_str()),
    ];
    let optional = [
        ("space name", &output.space_name),
        ("space guid", &output.space_guid),
        ("app name", &output.app_name),
        ("app guid", &output.app_guid),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            fields.push((key, value.as_str()));
        }
    }
    fields
}

/// `<type>\t<guid>\t<name>` for the most specific resource
fn convert_plain(output: &ConvertOutput) -> String {
    let (guid, name) = match (&output.app_guid, &output.space_guid) {
        (Some(guid), _) => (guid.as_str(), output.app_name.as_deref().unwrap_or_default()),
        (None, Some(guid)) => (guid.as_str(), output.space_name.as_deref().unwrap_or_default()),
        (None, None) => (output.org_guid.as_str(), output.org_name.as_str()),
    };
    format!("{}\t{}\t{}", output.kind, guid, name)
}

pub fn print_info(format: OutputFormat, target: &str, info: &ServerInfo) -> SeekerResult<()> {
    match format {
        OutputFormat::Json => print_json(info)?,
        OutputFormat::Plain => println!("{}", info.version),
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::intro(&ctx, target);
            ui::key_value(&ctx, "version", &info.version);
            let bosh = if info.bosh_configured {
                "enabled"
            } else {
                "disabled"
            };
            ui::key_value_status(&ctx, "BOSH", bosh, info.bosh_configured);
        }
    }
    Ok(())
}
