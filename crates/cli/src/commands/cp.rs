//! cp command - Copy files
//!
//! Copies between the local filesystem and a space in either direction, or
//! between two keys of the same space with a server-side copy.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use spaces_core::{ParsedPath, RemotePath, SpaceHandle, UploadOptions, parse_path};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

use super::open_space;

/// Copy files
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source path (local path or alias/space/key)
    pub source: String,

    /// Destination path (local path or alias/space[/key])
    pub target: String,

    /// Copy directories and prefixes recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Make uploaded or copied files publicly readable
    #[arg(long)]
    pub public: bool,

    /// Content type for uploaded files (guessed from the extension by default)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct CpOutput {
    status: &'static str,
    source: String,
    target: String,
    files: usize,
}

/// Execute the cp command
pub async fn execute(args: CpArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let source = match parse_path(&args.source) {
        Ok(p) => p,
        Err(e) => return formatter.fail("Invalid source", &e),
    };
    let target = match parse_path(&args.target) {
        Ok(p) => p,
        Err(e) => return formatter.fail("Invalid target", &e),
    };

    let result = match (&source, &target) {
        (ParsedPath::Local(src), ParsedPath::Remote(dst)) => {
            upload(src, dst, &args, &formatter).await
        }
        (ParsedPath::Remote(src), ParsedPath::Local(dst)) => {
            download(src, dst, &args, &formatter).await
        }
        (ParsedPath::Remote(src), ParsedPath::Remote(dst)) => {
            copy_within_space(src, dst, &args, &formatter).await
        }
        (ParsedPath::Local(_), ParsedPath::Local(_)) => {
            formatter.error("Cannot copy from local to local. Use system cp command.");
            Err(ExitCode::UsageError)
        }
    };

    match result {
        Ok(files) => {
            if formatter.is_json() {
                formatter.json(&CpOutput {
                    status: "success",
                    source: args.source.clone(),
                    target: args.target.clone(),
                    files,
                });
            } else {
                formatter.success(&format!(
                    "{} -> {} ({files} {})",
                    args.source,
                    args.target,
                    if files == 1 { "file" } else { "files" }
                ));
            }
            ExitCode::Success
        }
        Err(code) => code,
    }
}

fn upload_options(args: &CpArgs) -> UploadOptions {
    let options = UploadOptions::new().public(args.public);
    match &args.content_type {
        Some(content_type) => options.content_type(content_type),
        None => options,
    }
}

/// Key a single upload lands on: the target key, or the file name under it
/// when the target is a prefix
fn upload_key(dst: &RemotePath, src: &Path) -> Option<String> {
    if !dst.is_dir() {
        return Some(dst.key.clone());
    }
    let name = src.file_name()?.to_str()?;
    Some(dst.join(name).key)
}

async fn upload(
    src: &Path,
    dst: &RemotePath,
    args: &CpArgs,
    formatter: &Formatter,
) -> Result<usize, ExitCode> {
    let metadata = tokio::fs::metadata(src).await.map_err(|e| {
        formatter.error(&format!("Cannot read {}: {e}", src.display()));
        ExitCode::NotFound
    })?;

    if metadata.is_dir() && !args.recursive {
        formatter.error(&format!(
            "{} is a directory; use -r to copy it",
            src.display()
        ));
        return Err(ExitCode::UsageError);
    }

    let space = open_space(dst, formatter).await?;

    if metadata.is_dir() {
        if args.public || args.content_type.is_some() {
            formatter.warning("--public and --content-type apply to single files only");
        }
        let prefix = (!dst.key.is_empty()).then_some(dst.key.as_str());
        let spinner = ProgressBar::spinner(formatter.config(), &format!("Uploading {}", src.display()));
        let result = space.upload_directory(src, prefix).await;
        spinner.finish_and_clear();
        return result.map_err(|e| formatter.fail("Failed to upload directory", &e));
    }

    let Some(key) = upload_key(dst, src) else {
        formatter.error(&format!("No file name in {}", src.display()));
        return Err(ExitCode::UsageError);
    };
    space
        .upload_file(src, Some(&key), upload_options(args))
        .await
        .map(|_| 1)
        .map_err(|e| formatter.fail("Failed to upload file", &e))
}

/// Local path a single download lands on
fn download_path(src: &RemotePath, dst: &Path, dst_arg: &str) -> Option<PathBuf> {
    let into_dir = dst.is_dir() || dst_arg.ends_with('/') || dst_arg.ends_with(std::path::MAIN_SEPARATOR);
    if into_dir {
        Some(dst.join(src.file_name()?))
    } else {
        Some(dst.to_path_buf())
    }
}

async fn download(
    src: &RemotePath,
    dst: &Path,
    args: &CpArgs,
    formatter: &Formatter,
) -> Result<usize, ExitCode> {
    if args.public || args.content_type.is_some() {
        formatter.warning("--public and --content-type are ignored for downloads");
    }

    let space = open_space(src, formatter).await?;

    if args.recursive || src.is_dir() {
        let prefix = (!src.key.is_empty()).then_some(src.key.as_str());
        let spinner = ProgressBar::spinner(formatter.config(), &format!("Downloading {src}"));
        let result = space.download_directory(dst, prefix).await;
        spinner.finish_and_clear();
        return result.map_err(|e| formatter.fail("Failed to download", &e));
    }

    let Some(local) = download_path(src, dst, &args.target) else {
        formatter.error(&format!("'{src}' does not name a file"));
        return Err(ExitCode::UsageError);
    };
    if let Err(e) = prepare_parent(&local).await {
        formatter.error(&format!("{e:#}"));
        return Err(ExitCode::GeneralError);
    }

    let result = match space.file(&src.key).await {
        Ok(file) => file.download(&local).await,
        Err(e) => Err(e),
    };
    result
        .map(|()| 1)
        .map_err(|e| formatter.fail("Failed to download file", &e))
}

async fn prepare_parent(local: &Path) -> anyhow::Result<()> {
    if let Some(parent) = local.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

async fn copy_within_space(
    src: &RemotePath,
    dst: &RemotePath,
    args: &CpArgs,
    formatter: &Formatter,
) -> Result<usize, ExitCode> {
    if src.alias != dst.alias || src.space != dst.space {
        formatter.error("Server-side copies must stay within one space");
        return Err(ExitCode::UsageError);
    }
    if args.content_type.is_some() {
        formatter.warning("--content-type is ignored for server-side copies");
    }

    let space = open_space(src, formatter).await?;

    if args.recursive {
        return copy_prefix(&space, src, dst, args.public, formatter).await;
    }

    let key = if dst.is_dir() {
        match src.file_name() {
            Some(name) => dst.join(name).key,
            None => {
                formatter.error(&format!("'{src}' does not name a file"));
                return Err(ExitCode::UsageError);
            }
        }
    } else {
        dst.key.clone()
    };

    let result = match space.file(&src.key).await {
        Ok(file) => file.copy(&key, args.public).await,
        Err(e) => Err(e),
    };
    result
        .map(|_| 1)
        .map_err(|e| formatter.fail("Failed to copy file", &e))
}

async fn copy_prefix(
    space: &SpaceHandle,
    src: &RemotePath,
    dst: &RemotePath,
    public: bool,
    formatter: &Formatter,
) -> Result<usize, ExitCode> {
    let files = space
        .list_files(&src.key)
        .await
        .map_err(|e| formatter.fail("Failed to list files", &e))?;

    let spinner = ProgressBar::spinner(formatter.config(), &format!("Copying {src}"));
    let mut copied = 0;
    for (key, file) in &files {
        let relative = key[src.key.len()..].trim_start_matches('/');
        if relative.is_empty() {
            continue;
        }
        let target = dst.join(relative);
        if let Err(e) = file.copy(&target.key, public).await {
            spinner.finish_and_clear();
            return Err(formatter.fail(&format!("Failed to copy {key}"), &e));
        }
        copied += 1;
    }
    spinner.finish_and_clear();
    Ok(copied)
}
