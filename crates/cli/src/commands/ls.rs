//! ls command - List spaces and files
//!
//! Lists spaces when given an alias only, or every file under a prefix when
//! given a space path. File listings are aggregated across all pages.

use clap::Args;
use serde::Serialize;
use spaces_core::{FileHandle, RemotePath, SpaceHandle, StorageService};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size, format_timestamp, new_table};

use super::{connect, remote_arg};

/// List spaces or files
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Alias (alias or alias/) or space path (alias/space[/prefix])
    pub path: String,

    /// Print totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

#[derive(Debug, Serialize)]
struct SpaceEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<i64>,
}

#[derive(Debug, Serialize)]
struct FileEntry {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

#[derive(Debug, Serialize)]
struct LsOutput<T: Serialize> {
    items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

/// What an ls argument points at
#[derive(Debug, PartialEq, Eq)]
enum Target {
    Alias(String),
    Space(RemotePath),
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match parse_target(&args.path, &formatter) {
        Ok(target) => target,
        Err(code) => return code,
    };

    match target {
        Target::Alias(alias) => {
            let service = match connect(&alias, &formatter).await {
                Ok(service) => service,
                Err(code) => return code,
            };
            list_spaces(&service, &formatter, args.summarize).await
        }
        Target::Space(path) => {
            let service = match connect(&path.alias, &formatter).await {
                Ok(service) => service,
                Err(code) => return code,
            };
            let space = match service.open(&path.space).await {
                Ok(space) => space,
                Err(e) => return formatter.fail("Failed to open space", &e),
            };
            list_files(&space, &path.key, &formatter, args.summarize).await
        }
    }
}

fn parse_target(path: &str, formatter: &Formatter) -> Result<Target, ExitCode> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        formatter.error("Path cannot be empty");
        return Err(ExitCode::UsageError);
    }
    if !trimmed.contains('/') {
        return Ok(Target::Alias(trimmed.to_string()));
    }
    remote_arg(path, formatter).map(Target::Space)
}

async fn list_spaces(service: &StorageService, formatter: &Formatter, summarize: bool) -> ExitCode {
    let buckets = match service.buckets().await {
        Ok(buckets) => buckets,
        Err(e) => return formatter.fail("Failed to list spaces", &e),
    };

    if formatter.is_json() {
        formatter.json(&LsOutput {
            summary: summarize.then(|| Summary {
                total_objects: buckets.len(),
                total_size_bytes: 0,
                total_size_human: format_size(0),
            }),
            items: buckets
                .into_iter()
                .map(|b| SpaceEntry {
                    name: b.name,
                    created: b.creation_date,
                })
                .collect(),
        });
    } else {
        let mut table = new_table(&["CREATED", "SPACE"]);
        for bucket in &buckets {
            table.add_row(vec![
                format_timestamp(bucket.creation_date),
                format!("{}/", bucket.name),
            ]);
        }
        if !buckets.is_empty() {
            formatter.table(&table);
        }
        if summarize {
            formatter.println(&format!("\nTotal: {} spaces", buckets.len()));
        }
    }
    ExitCode::Success
}

async fn list_files(
    space: &SpaceHandle,
    prefix: &str,
    formatter: &Formatter,
    summarize: bool,
) -> ExitCode {
    let files = match space.list_files(prefix).await {
        Ok(files) => files,
        Err(e) => return formatter.fail("Failed to list files", &e),
    };

    let mut entries = Vec::with_capacity(files.len());
    for (key, file) in files {
        match file_entry(key, &file).await {
            Ok(entry) => entries.push(entry),
            Err(e) => return formatter.fail("Failed to read file metadata", &e),
        }
    }

    let total_size: i64 = entries.iter().filter_map(|e| e.size_bytes).sum();
    let summary = summarize.then(|| Summary {
        total_objects: entries.len(),
        total_size_bytes: total_size,
        total_size_human: format_size(total_size),
    });

    if formatter.is_json() {
        formatter.json(&LsOutput {
            items: entries,
            summary,
        });
        return ExitCode::Success;
    }

    let mut table = new_table(&["MODIFIED", "SIZE", "KEY"]);
    for entry in &entries {
        table.add_row(vec![
            format_timestamp(entry.last_modified),
            format_size(entry.size_bytes.unwrap_or(0)),
            entry.key.clone(),
        ]);
    }
    if !entries.is_empty() {
        formatter.table(&table);
    }
    if let Some(summary) = summary {
        formatter.println(&format!(
            "\nTotal: {} files, {}",
            summary.total_objects, summary.total_size_human
        ));
    }
    ExitCode::Success
}

/// Seeded from the listing, so these never round-trip
async fn file_entry(key: String, file: &FileHandle) -> spaces_core::Result<FileEntry> {
    Ok(FileEntry {
        size_bytes: file.content_length().await?,
        last_modified: file.last_modified().await?,
        etag: file.e_tag().await?,
        key,
    })
}
