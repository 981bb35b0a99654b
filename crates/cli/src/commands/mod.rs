//! CLI command definitions and execution
//!
//! Every command resolves an alias to credentials, connects a
//! [`spaces_core::StorageService`] and works through space and file handles.

use clap::{Parser, Subcommand};
use spaces_core::config::{ColorMode, Defaults, OutputFormat};
use spaces_core::{AliasManager, ConfigManager, RemotePath, SpaceHandle, StorageService};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod acl;
mod alias;
mod cat;
mod completions;
mod cors;
pub mod cp;
mod ls;
mod mb;
mod rb;
mod rm;
mod share;
mod stat;

/// spaces - client for S3-compatible Spaces object storage
///
/// Create and destroy spaces, move files in and out, toggle public access,
/// manage CORS origins and hand out presigned links.
#[derive(Parser, Debug)]
#[command(name = "spaces")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinners
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage saved accounts
    #[command(subcommand)]
    Alias(alias::AliasCommands),

    /// List spaces or files
    Ls(ls::LsArgs),

    /// Create a space
    Mb(mb::MbArgs),

    /// Destroy a space and everything in it
    Rb(rb::RbArgs),

    /// Print file contents
    Cat(cat::CatArgs),

    /// Show file metadata
    Stat(stat::StatArgs),

    /// Copy files (local<->space, within a space)
    Cp(cp::CpArgs),

    /// Remove files
    Rm(rm::RmArgs),

    /// Show or change public access
    #[command(subcommand)]
    Acl(acl::AclCommands),

    /// Manage CORS origins of a space
    #[command(subcommand)]
    Cors(cors::CorsCommands),

    /// Print a presigned or public URL for a file
    Share(share::ShareArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let defaults = load_defaults();
    if defaults.color == ColorMode::Always && !cli.no_color {
        console::set_colors_enabled(true);
        console::set_colors_enabled_stderr(true);
    }
    let output_config = output_config(&cli, &defaults);

    match cli.command {
        Commands::Alias(cmd) => alias::execute(cmd, output_config).await,
        Commands::Ls(args) => ls::execute(args, output_config).await,
        Commands::Mb(args) => mb::execute(args, output_config).await,
        Commands::Rb(args) => rb::execute(args, output_config).await,
        Commands::Cat(args) => cat::execute(args, output_config).await,
        Commands::Stat(args) => stat::execute(args, output_config).await,
        Commands::Cp(args) => cp::execute(args, output_config).await,
        Commands::Rm(args) => rm::execute(args, output_config).await,
        Commands::Acl(cmd) => acl::execute(cmd, output_config).await,
        Commands::Cors(cmd) => cors::execute(cmd, output_config).await,
        Commands::Share(args) => share::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Defaults from the config file; an unreadable file falls back to built-ins
fn load_defaults() -> Defaults {
    match ConfigManager::new().and_then(|manager| {
        tracing::debug!(path = %manager.config_path().display(), "Loading configuration");
        manager.load()
    }) {
        Ok(config) => config.defaults,
        Err(e) => {
            tracing::debug!(error = %e, "Using built-in defaults");
            Defaults::default()
        }
    }
}

/// Either a flag or a config default can switch json, no-color or no-progress on
fn output_config(cli: &Cli, defaults: &Defaults) -> OutputConfig {
    OutputConfig {
        json: cli.json || defaults.output == OutputFormat::Json,
        no_color: cli.no_color || defaults.color == ColorMode::Never,
        no_progress: cli.no_progress || !defaults.progress,
        quiet: cli.quiet,
    }
}

/// Parse a remote path argument, reporting a usage error on failure
pub(crate) fn remote_arg(path: &str, formatter: &Formatter) -> Result<RemotePath, ExitCode> {
    spaces_core::parse_remote(path).map_err(|e| {
        formatter.error(&e.to_string());
        ExitCode::UsageError
    })
}

/// Connect to the account saved under `alias_name`
pub(crate) async fn connect(
    alias_name: &str,
    formatter: &Formatter,
) -> Result<StorageService, ExitCode> {
    let alias = AliasManager::new()
        .and_then(|manager| manager.get(alias_name))
        .map_err(|e| formatter.fail("Failed to load alias", &e))?;

    tracing::debug!(alias = %alias.name, region = %alias.region, "Connecting");
    spaces_s3::connect(alias.credentials())
        .await
        .map_err(|e| formatter.fail("Failed to connect", &e))
}

/// Connect and open the space a remote path points into
pub(crate) async fn open_space(
    path: &RemotePath,
    formatter: &Formatter,
) -> Result<SpaceHandle, ExitCode> {
    let service = connect(&path.alias, formatter).await?;
    service
        .open(&path.space)
        .await
        .map_err(|e| formatter.fail("Failed to open space", &e))
}
