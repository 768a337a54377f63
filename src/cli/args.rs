//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cfseeker - find where Cloud Foundry app instances are running
///
/// Resolves an app's instances to host IPs and ports and, when a BOSH
/// director is configured, to the VMs hosting them.
#[derive(Parser, Debug)]
#[command(name = "cfseeker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CFSEEKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// URL of a cfseeker server to query instead of the APIs directly
    #[arg(short, long, global = true, env = "CFSEEKER_TARGET")]
    pub target: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the instances of an app and the VMs they run on
    Find(FindArgs),

    /// Convert between org/space/app names and GUIDs
    Convert(ConvertArgs),

    /// Run the cfseeker HTTP server
    Server(ServerArgs),

    /// Invalidate the BOSH VM cache of a cfseeker server
    Invalidate,

    /// Show information about a cfseeker server
    #[command(alias = "meta")]
    Info,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the find command
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Name of the org the app is in
    #[arg(short, long, conflicts_with = "app_guid")]
    pub org: Option<String>,

    /// Name of the space the app is in
    #[arg(short, long, conflicts_with = "app_guid")]
    pub space: Option<String>,

    /// Name of the app
    #[arg(short, long, conflicts_with = "app_guid")]
    pub app: Option<String>,

    /// GUID of the app
    #[arg(short = 'g', long)]
    pub app_guid: Option<String>,
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// What to convert
    #[command(subcommand)]
    pub resource: ConvertTarget,
}

/// Convert subcommands
#[derive(Subcommand, Debug)]
pub enum ConvertTarget {
    /// Look up the resource a GUID belongs to
    Guid {
        /// GUID of an org, space or app
        #[arg(short, long)]
        guid: String,
    },

    /// Look up an org's GUID
    Org {
        /// Org name
        #[arg(short, long)]
        org: String,
    },

    /// Look up a space's GUID
    Space {
        /// Org name
        #[arg(short, long)]
        org: String,

        /// Space name
        #[arg(short, long)]
        space: String,
    },

    /// Look up an app's GUID
    App {
        /// Org name
        #[arg(short, long)]
        org: String,

        /// Space name
        #[arg(short, long)]
        space: String,

        /// App name
        #[arg(short, long)]
        app: String,
    },
}

/// Arguments for the server command
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Running as a Cloud Foundry app: listen on $PORT
    #[arg(long)]
    pub cf: bool,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration with secrets redacted
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text, tab separated
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_find_by_names() {
        let cli = Cli::parse_from(["cfseeker", "find", "-o", "acme", "-s", "prod", "-a", "web"]);
        match cli.command {
            Commands::Find(args) => {
                assert_eq!(args.org.as_deref(), Some("acme"));
                assert_eq!(args.app.as_deref(), Some("web"));
                assert!(args.app_guid.is_none());
            }
            _ => panic!("expected find"),
        }
    }

    #[test]
    fn parse_find_guid_conflicts_with_names() {
        assert!(Cli::try_parse_from(["cfseeker", "find", "-g", "x", "-o", "acme"]).is_err());
    }

    #[test]
    fn parse_convert_space() {
        let cli = Cli::parse_from(["cfseeker", "convert", "space", "-o", "acme", "-s", "prod"]);
        assert!(matches!(
            cli.command,
            Commands::Convert(ConvertArgs {
                resource: ConvertTarget::Space { .. }
            })
        ));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "cfseeker",
            "info",
            "-t",
            "https://seeker.example.com",
            "-f",
            "json",
            "-vv",
        ]);
        assert_eq!(cli.target.as_deref(), Some("https://seeker.example.com"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn meta_is_info_alias() {
        let cli = Cli::parse_from(["cfseeker", "meta", "-t", "http://localhost:8080"]);
        assert!(matches!(cli.command, Commands::Info));
    }
}
