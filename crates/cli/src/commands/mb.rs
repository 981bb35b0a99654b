//! mb command - Make a space
//!
//! Creates a new space, private unless `--public` is given.

use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

use super::{connect, remote_arg};

/// Create a space
#[derive(Args, Debug)]
pub struct MbArgs {
    /// Target path (alias/space)
    pub target: String,

    /// Make the space publicly listable
    #[arg(long)]
    pub public: bool,

    /// Succeed if the space already exists
    #[arg(short = 'p', long)]
    pub ignore_existing: bool,
}

#[derive(Debug, Serialize)]
struct MbOutput {
    status: &'static str,
    space: String,
    public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Execute the mb command
pub async fn execute(args: MbArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(args.target.trim_end_matches('/'), &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    if !path.key.is_empty() {
        formatter.error(&format!("Expected alias/space, got '{}'", args.target));
        return ExitCode::UsageError;
    }
    if let Err(msg) = validate_space_name(&path.space) {
        formatter.error(&msg);
        return ExitCode::UsageError;
    }

    let service = match connect(&path.alias, &formatter).await {
        Ok(service) => service,
        Err(code) => return code,
    };

    let message = match service.create(&path.space, args.public).await {
        Ok(_) => None,
        Err(spaces_core::Error::SpaceAlreadyExists(_)) if args.ignore_existing => {
            Some("Space already exists".to_string())
        }
        Err(e) => return formatter.fail("Failed to create space", &e),
    };

    if formatter.is_json() {
        formatter.json(&MbOutput {
            status: "success",
            space: path.space.clone(),
            public: args.public,
            message,
        });
    } else if message.is_some() {
        formatter.success(&format!("Space '{path}' already exists."));
    } else {
        formatter.success(&format!("Space '{path}' created successfully."));
    }
    ExitCode::Success
}

/// Space names follow S3 bucket naming: 3-63 lowercase letters, digits and
/// hyphens, starting and ending with a letter or digit
fn validate_space_name(name: &str) -> Result<(), String> {
    if name.len() < 3 || name.len() > 63 {
        return Err("Space name must be between 3 and 63 characters".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "Invalid space name '{name}': use lowercase letters, digits and '-'"
        ));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(format!(
            "Invalid space name '{name}': must start and end with a letter or digit"
        ));
    }
    Ok(())
}
