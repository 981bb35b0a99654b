//! rb command - Remove a space
//!
//! Deletes every file in the space, then the space itself. Without `--force`
//! a non-empty space is refused.

use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

use super::{open_space, remote_arg};

/// Destroy a space
#[derive(Args, Debug)]
pub struct RbArgs {
    /// Target path (alias/space)
    pub target: String,

    /// Delete the space even if it still holds files
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct RbOutput {
    status: &'static str,
    space: String,
}

/// Execute the rb command
pub async fn execute(args: RbArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(args.target.trim_end_matches('/'), &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    if !path.key.is_empty() {
        formatter.error(&format!("Expected alias/space, got '{}'", args.target));
        return ExitCode::UsageError;
    }

    let space = match open_space(&path, &formatter).await {
        Ok(space) => space,
        Err(code) => return code,
    };

    if !args.force {
        match space.list_files("").await {
            Ok(files) if !files.is_empty() => {
                formatter.error(&format!(
                    "Space '{path}' holds {} files; use --force to delete them",
                    files.len()
                ));
                return ExitCode::Conflict;
            }
            Ok(_) => {}
            Err(e) => return formatter.fail("Failed to list files", &e),
        }
    }

    let spinner = ProgressBar::spinner(formatter.config(), &format!("Destroying {path}"));
    let result = space.destroy().await;
    spinner.finish_and_clear();

    if let Err(e) = result {
        return formatter.fail("Failed to destroy space", &e);
    }

    if formatter.is_json() {
        formatter.json(&RbOutput {
            status: "success",
            space: path.space.clone(),
        });
    } else {
        formatter.success(&format!("Space '{path}' removed successfully."));
    }
    ExitCode::Success
}
