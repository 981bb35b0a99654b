//! share command - Print a link to a file
//!
//! By default prints a presigned GET URL. With `--public-url` prints the
//! plain object URL, which only works for public files.

use clap::Args;
use serde::Serialize;
use spaces_core::{Expiry, FileHandle};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

use super::{open_space, remote_arg};

/// Print a presigned or public URL for a file
#[derive(Args, Debug)]
pub struct ShareArgs {
    /// File path (alias/space/key)
    pub path: String,

    /// Validity: a span ("15 minutes", "2h", "P1D"), an RFC 3339 instant or
    /// epoch seconds
    #[arg(long, default_value = spaces_core::expiry::DEFAULT_EXPIRY, conflicts_with = "public_url")]
    pub expire: String,

    /// Print the unsigned public URL instead
    #[arg(long)]
    pub public_url: bool,
}

#[derive(Debug, Serialize)]
struct ShareOutput {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public: Option<bool>,
}

/// Execute the share command
pub async fn execute(args: ShareArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(&args.path, &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    let key = match path.require_key() {
        Ok(key) => key.to_string(),
        Err(e) => return formatter.fail("Nothing to share", &e),
    };

    let expiry = if args.public_url {
        None
    } else {
        match args.expire.parse::<Expiry>() {
            Ok(expiry) => Some(expiry),
            Err(e) => return formatter.fail("Invalid --expire", &e),
        }
    };

    let space = match open_space(&path, &formatter).await {
        Ok(space) => space,
        Err(code) => return code,
    };

    let output = match space.file(&key).await {
        Ok(file) => link(&file, expiry.as_ref()).await,
        Err(e) => Err(e),
    };
    let output = match output {
        Ok(output) => output,
        Err(e) => return formatter.fail("Failed to share file", &e),
    };

    if formatter.is_json() {
        formatter.json(&output);
    } else {
        if output.public == Some(false) {
            formatter.warning(&format!("'{path}' is private; this URL will be refused"));
        }
        formatter.println(&output.url);
    }
    ExitCode::Success
}

async fn link(file: &FileHandle, expiry: Option<&Expiry>) -> spaces_core::Result<ShareOutput> {
    match expiry {
        Some(expiry) => Ok(ShareOutput {
            url: file.signed_url(expiry).await?,
            expires_in_seconds: Some(expiry.resolve()?.as_secs()),
            public: None,
        }),
        None => Ok(ShareOutput {
            url: file.url()?,
            expires_in_seconds: None,
            public: Some(file.is_public().await?),
        }),
    }
}
