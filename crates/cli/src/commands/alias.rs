//! Alias management commands
//!
//! An alias is a saved Spaces account: credentials plus the region and host
//! they connect to. Every remote path starts with an alias name.

use clap::Subcommand;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, new_table};
use spaces_core::path::is_valid_alias_name;
use spaces_core::{Alias, AliasManager, BucketLookup};

/// Alias subcommands for managing saved accounts
#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Add or update an alias
    Set(SetArgs),

    /// List all configured aliases
    List(ListArgs),

    /// Remove an alias
    Remove(RemoveArgs),
}

/// Arguments for the `alias set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Alias name (e.g., "do", "nyc")
    pub name: String,

    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Region slug
    #[arg(long, default_value = "ams3")]
    pub region: String,

    /// Service host, or a full endpoint URL for other S3-compatible servers
    #[arg(long, default_value = "digitaloceanspaces.com")]
    pub host: String,

    /// Bucket lookup style: auto, path, or dns
    #[arg(long, default_value = "auto")]
    pub bucket_lookup: String,

    /// Replace an existing alias with the same name
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `alias list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show region, host and lookup style
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `alias remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the alias to remove
    pub name: String,
}

/// JSON output for alias list
#[derive(Serialize)]
struct AliasListOutput {
    aliases: Vec<AliasInfo>,
}

/// Alias information for JSON output (without sensitive data)
#[derive(Serialize)]
struct AliasInfo {
    name: String,
    region: String,
    host: String,
    bucket_lookup: String,
}

impl From<&Alias> for AliasInfo {
    fn from(alias: &Alias) -> Self {
        Self {
            name: alias.name.clone(),
            region: alias.region.clone(),
            host: alias.host.clone(),
            bucket_lookup: alias.bucket_lookup.to_string(),
        }
    }
}

/// JSON output for alias set/remove operations
#[derive(Serialize)]
struct AliasOperationOutput {
    success: bool,
    alias: String,
    message: String,
}

/// Execute an alias subcommand
pub async fn execute(cmd: AliasCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let alias_manager = match AliasManager::new() {
        Ok(am) => am,
        Err(e) => return formatter.fail("Failed to load configuration", &e),
    };

    match cmd {
        AliasCommands::Set(args) => execute_set(args, &alias_manager, &formatter),
        AliasCommands::List(args) => execute_list(args, &alias_manager, &formatter),
        AliasCommands::Remove(args) => execute_remove(args, &alias_manager, &formatter),
    }
}

fn build_alias(args: &SetArgs) -> Result<Alias, String> {
    if !is_valid_alias_name(&args.name) {
        return Err(format!(
            "Invalid alias name '{}': use letters, digits, '-' and '_'",
            args.name
        ));
    }
    if args.access_key.is_empty() || args.secret_key.is_empty() {
        return Err("Access key and secret key cannot be empty".to_string());
    }
    if args.region.is_empty() || args.host.is_empty() {
        return Err("Region and host cannot be empty".to_string());
    }

    let bucket_lookup: BucketLookup = args.bucket_lookup.parse().map_err(|e| format!("{e}"))?;

    let mut alias = Alias::new(&args.name, &args.access_key, &args.secret_key);
    alias.region = args.region.clone();
    alias.host = args.host.clone();
    alias.bucket_lookup = bucket_lookup;
    Ok(alias)
}

fn operation_done(formatter: &Formatter, name: &str, message: String) {
    if formatter.is_json() {
        formatter.json(&AliasOperationOutput {
            success: true,
            alias: name.to_string(),
            message,
        });
    } else {
        formatter.success(&message);
    }
}

fn execute_set(args: SetArgs, manager: &AliasManager, formatter: &Formatter) -> ExitCode {
    let alias = match build_alias(&args) {
        Ok(alias) => alias,
        Err(msg) => {
            formatter.error(&msg);
            return ExitCode::UsageError;
        }
    };

    let existed = manager.exists(&args.name).unwrap_or(false);
    match manager.set(alias, args.force) {
        Ok(()) => {
            let verb = if existed { "updated" } else { "configured" };
            operation_done(
                formatter,
                &args.name,
                format!("Alias '{}' {verb} successfully", args.name),
            );
            ExitCode::Success
        }
        Err(e @ spaces_core::Error::AliasExists(_)) => {
            formatter.error(&format!("{e} (use --force to replace it)"));
            ExitCode::Conflict
        }
        Err(e) => formatter.fail("Failed to save alias", &e),
    }
}

fn execute_list(args: ListArgs, manager: &AliasManager, formatter: &Formatter) -> ExitCode {
    let aliases = match manager.list() {
        Ok(aliases) => aliases,
        Err(e) => return formatter.fail("Failed to list aliases", &e),
    };

    if formatter.is_json() {
        formatter.json(&AliasListOutput {
            aliases: aliases.iter().map(AliasInfo::from).collect(),
        });
    } else if aliases.is_empty() {
        formatter.println("No aliases configured.");
    } else if args.long {
        let mut table = new_table(&["NAME", "REGION", "HOST", "LOOKUP"]);
        for alias in &aliases {
            table.add_row(vec![
                alias.name.clone(),
                alias.region.clone(),
                alias.host.clone(),
                alias.bucket_lookup.to_string(),
            ]);
        }
        formatter.table(&table);
    } else {
        for alias in &aliases {
            formatter.println(&format!("{:<12} {}", alias.name, alias.region));
        }
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &AliasManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            operation_done(
                formatter,
                &args.name,
                format!("Alias '{}' removed successfully", args.name),
            );
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to remove alias", &e),
    }
}
