//! cors command - Manage CORS origins of a space
//!
//! Rules are keyed by origin: adding an origin that already has a rule
//! replaces it, removing an origin drops its rule.

use clap::Subcommand;
use serde::Serialize;
use spaces_core::{CorsMethod, CorsRule, SpaceHandle};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, new_table};

use super::{open_space, remote_arg};

/// CORS subcommands
#[derive(Subcommand, Debug)]
pub enum CorsCommands {
    /// List the CORS rules of a space
    List(SpaceArg),

    /// Allow an origin, replacing any existing rule for it
    Add(AddArgs),

    /// Remove the rule for an origin
    Remove(RemoveArgs),

    /// Remove every CORS rule
    Clear(SpaceArg),
}

#[derive(clap::Args, Debug)]
pub struct SpaceArg {
    /// Space path (alias/space)
    pub path: String,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Space path (alias/space)
    pub path: String,

    /// Origin to allow, e.g. https://example.com or *
    pub origin: String,

    /// Allowed methods, comma separated
    #[arg(long, value_delimiter = ',', default_value = "GET")]
    pub methods: Vec<CorsMethod>,

    /// Allowed request headers, comma separated
    #[arg(long, value_delimiter = ',')]
    pub headers: Vec<String>,

    /// Seconds browsers may cache the preflight response
    #[arg(long, default_value_t = 0)]
    pub max_age: u32,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Space path (alias/space)
    pub path: String,

    /// Origin whose rule is removed
    pub origin: String,
}

#[derive(Debug, Serialize)]
struct CorsListOutput {
    space: String,
    rules: Vec<CorsRule>,
}

#[derive(Debug, Serialize)]
struct CorsOperationOutput {
    status: &'static str,
    space: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
}

/// Execute a cors subcommand
pub async fn execute(cmd: CorsCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let raw_path = match &cmd {
        CorsCommands::List(args) | CorsCommands::Clear(args) => &args.path,
        CorsCommands::Add(args) => &args.path,
        CorsCommands::Remove(args) => &args.path,
    };
    let path = match remote_arg(raw_path.trim_end_matches('/'), &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    if !path.key.is_empty() {
        formatter.error(&format!("CORS rules belong to a space; expected alias/space, got '{path}'"));
        return ExitCode::UsageError;
    }

    let space = match open_space(&path, &formatter).await {
        Ok(space) => space,
        Err(code) => return code,
    };

    match cmd {
        CorsCommands::List(_) => list(&space, &formatter).await,
        CorsCommands::Add(args) => {
            let result = space
                .add_cors_origin(&args.origin, args.methods, args.max_age, args.headers)
                .await;
            finish(&space, Some(args.origin), result, "added", &formatter)
        }
        CorsCommands::Remove(args) => {
            let result = space.remove_cors_origin(&args.origin).await;
            finish(&space, Some(args.origin), result, "removed", &formatter)
        }
        CorsCommands::Clear(_) => {
            let result = space.remove_all_cors_origins().await;
            finish(&space, None, result, "cleared", &formatter)
        }
    }
}

async fn list(space: &SpaceHandle, formatter: &Formatter) -> ExitCode {
    let rules = match space.cors_rules().await {
        Ok(rules) => rules.unwrap_or_default(),
        Err(e) => return formatter.fail("Failed to read CORS rules", &e),
    };

    if formatter.is_json() {
        formatter.json(&CorsListOutput {
            space: space.name().to_string(),
            rules,
        });
    } else if rules.is_empty() {
        formatter.println(&format!("No CORS rules on '{}'.", space.name()));
    } else {
        let mut table = new_table(&["ORIGIN", "METHODS", "HEADERS", "MAX AGE"]);
        for rule in &rules {
            table.add_row(rule_row(rule));
        }
        formatter.table(&table);
    }
    ExitCode::Success
}

fn rule_row(rule: &CorsRule) -> Vec<String> {
    let methods: Vec<&str> = rule.allowed_methods.iter().map(CorsMethod::as_str).collect();
    let headers = if rule.allowed_headers.is_empty() {
        "-".to_string()
    } else {
        rule.allowed_headers.join(",")
    };
    vec![
        rule.allowed_origins.join(","),
        methods.join(","),
        headers,
        format!("{}s", rule.max_age_seconds),
    ]
}

fn finish(
    space: &SpaceHandle,
    origin: Option<String>,
    result: spaces_core::Result<()>,
    verb: &str,
    formatter: &Formatter,
) -> ExitCode {
    if let Err(e) = result {
        return formatter.fail("CORS update failed", &e);
    }

    if formatter.is_json() {
        formatter.json(&CorsOperationOutput {
            status: "success",
            space: space.name().to_string(),
            origin,
        });
    } else {
        match origin {
            Some(origin) => formatter.success(&format!("CORS origin '{origin}' {verb}.")),
            None => formatter.success(&format!("CORS rules of '{}' {verb}.", space.name())),
        }
    }
    ExitCode::Success
}
