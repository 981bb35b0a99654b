//! rm command - Remove files
//!
//! Removes single files, or every file under a prefix with `-r`.

use clap::Args;
use serde::Serialize;
use spaces_core::RemotePath;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

use super::{open_space, remote_arg};

/// Remove files
#[derive(Args, Debug)]
pub struct RmArgs {
    /// File path(s) to remove (alias/space/key or alias/space/prefix/)
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Remove every file under the given prefix
    #[arg(short, long)]
    pub recursive: bool,

    /// Allow `-r` on a whole space
    #[arg(short, long)]
    pub force: bool,

    /// Only show what would be deleted
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    deleted: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    would_delete: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<String>,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let mut paths = Vec::with_capacity(args.paths.len());
    for raw in &args.paths {
        let path = match remote_arg(raw, &formatter) {
            Ok(path) => path,
            Err(code) => return code,
        };
        if let Err(msg) = check_path(&path, &args) {
            formatter.error(&msg);
            return ExitCode::UsageError;
        }
        paths.push(path);
    }

    let mut output = RmOutput {
        status: "success",
        deleted: 0,
        would_delete: Vec::new(),
        failed: Vec::new(),
    };
    let mut exit_code = ExitCode::Success;

    for path in &paths {
        match remove_path(path, &args, &formatter, &mut output).await {
            Ok(()) => {}
            Err(code) => {
                output.failed.push(path.to_string());
                exit_code = code;
            }
        }
    }

    if !output.failed.is_empty() {
        output.status = "partial";
    }

    if formatter.is_json() {
        formatter.json(&output);
    } else if args.dry_run {
        for path in &output.would_delete {
            formatter.println(&format!("Would remove: {path}"));
        }
    } else if output.failed.is_empty() {
        formatter.success(&format!("Removed {} file(s).", output.deleted));
    } else {
        formatter.warning(&format!(
            "Removed {} file(s); {} path(s) failed.",
            output.deleted,
            output.failed.len()
        ));
    }
    exit_code
}

fn check_path(path: &RemotePath, args: &RmArgs) -> Result<(), String> {
    if path.key.is_empty() && !(args.recursive && args.force) {
        return Err(format!(
            "'{path}' names a whole space; use -r --force to empty it or rb to remove it"
        ));
    }
    if path.is_dir() && !args.recursive {
        return Err(format!("'{path}' is a prefix; use -r to remove it"));
    }
    Ok(())
}

async fn remove_path(
    path: &RemotePath,
    args: &RmArgs,
    formatter: &Formatter,
    output: &mut RmOutput,
) -> Result<(), ExitCode> {
    let space = open_space(path, formatter).await?;

    if args.dry_run {
        let keys: Vec<String> = if args.recursive {
            space
                .list_files(&path.key)
                .await
                .map_err(|e| formatter.fail("Failed to list files", &e))?
                .into_keys()
                .collect()
        } else {
            space
                .file(&path.key)
                .await
                .map_err(|e| formatter.fail("Failed to find file", &e))?;
            vec![path.key.clone()]
        };
        output.would_delete.extend(
            keys.into_iter()
                .map(|key| RemotePath::new(&path.alias, &path.space, key).to_string()),
        );
        return Ok(());
    }

    if args.recursive {
        let spinner = ProgressBar::spinner(formatter.config(), &format!("Removing {path}"));
        let result = space.delete_directory(&path.key).await;
        spinner.finish_and_clear();
        let count = result.map_err(|e| formatter.fail(&format!("Failed to remove {path}"), &e))?;
        output.deleted += count;
        return Ok(());
    }

    let result = match space.file(&path.key).await {
        Ok(file) => file.delete().await,
        Err(e) => Err(e),
    };
    result.map_err(|e| formatter.fail(&format!("Failed to remove {path}"), &e))?;
    output.deleted += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(recursive: bool, force: bool) -> RmArgs {
        RmArgs {
            paths: vec![],
            recursive,
            force,
            dry_run: false,
        }
    }

    #[test]
    fn test_single_file_needs_no_flags() {
        let path = RemotePath::new("do", "t1", "a.txt");
        assert!(check_path(&path, &args(false, false)).is_ok());
    }

    #[test]
    fn test_prefix_needs_recursive() {
        let path = RemotePath::new("do", "t1", "logs/");
        assert!(check_path(&path, &args(false, false)).is_err());
        assert!(check_path(&path, &args(true, false)).is_ok());
    }

    #[test]
    fn test_whole_space_needs_force() {
        let path = RemotePath::new("do", "t1", "");
        assert!(check_path(&path, &args(true, false)).is_err());
        assert!(check_path(&path, &args(true, true)).is_ok());
    }
}
