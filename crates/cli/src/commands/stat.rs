//! stat command - Show file metadata
//!
//! Displays the cached metadata of a file along with its public URL and
//! whether anonymous users can read it.

use clap::Args;
use serde::Serialize;
use spaces_core::{FileHandle, ObjectMetadata};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size, format_timestamp};

use super::{open_space, remote_arg};

/// Show file metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// File path (alias/space/key)
    pub path: String,
}

#[derive(Debug, Serialize)]
struct StatOutput {
    space: String,
    key: String,
    #[serde(flatten)]
    metadata: ObjectMetadata,
    public: bool,
    url: String,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(&args.path, &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    let key = match path.require_key() {
        Ok(key) => key.to_string(),
        Err(e) => return formatter.fail("Nothing to stat", &e),
    };

    let space = match open_space(&path, &formatter).await {
        Ok(space) => space,
        Err(code) => return code,
    };

    let output = match space.file(&key).await {
        Ok(file) => describe(&file).await,
        Err(e) => Err(e),
    };
    let output = match output {
        Ok(output) => output,
        Err(e) => return formatter.fail("Failed to stat file", &e),
    };

    if formatter.is_json() {
        formatter.json(&output);
    } else {
        for line in render(&output) {
            formatter.println(&line);
        }
    }
    ExitCode::Success
}

async fn describe(file: &FileHandle) -> spaces_core::Result<StatOutput> {
    Ok(StatOutput {
        space: file.space_name().to_string(),
        key: file.key().to_string(),
        metadata: file.metadata().await?,
        public: file.is_public().await?,
        url: file.url()?,
    })
}

fn render(output: &StatOutput) -> Vec<String> {
    let meta = &output.metadata;
    let mut lines = vec![
        format!("Name      : {}", output.key),
        format!("Space     : {}", output.space),
        format!("Date      : {}", format_timestamp(meta.last_modified)),
    ];
    if let Some(size) = meta.content_length {
        lines.push(format!("Size      : {} ({size} bytes)", format_size(size)));
    }
    if let Some(etag) = &meta.e_tag {
        lines.push(format!("ETag      : {etag}"));
    }
    if let Some(content_type) = &meta.content_type {
        lines.push(format!("Type      : {content_type}"));
    }
    if meta.expiration.is_some() {
        lines.push(format!("Expires   : {}", format_timestamp(meta.expiration)));
    }
    lines.push(format!(
        "Access    : {}",
        if output.public { "public" } else { "private" }
    ));
    lines.push(format!("URL       : {}", output.url));
    lines
}
