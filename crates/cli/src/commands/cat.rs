//! cat command - Display file contents
//!
//! Writes the raw contents of a file to stdout.

use std::io::{self, Write};

use anyhow::Context;
use clap::Args;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

use super::{open_space, remote_arg};

/// Display file contents
#[derive(Args, Debug)]
pub struct CatArgs {
    /// File path (alias/space/key)
    pub path: String,
}

/// Execute the cat command
pub async fn execute(args: CatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match remote_arg(&args.path, &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    let key = match path.require_key() {
        Ok(key) => key.to_string(),
        Err(e) => return formatter.fail("Nothing to print", &e),
    };

    let space = match open_space(&path, &formatter).await {
        Ok(space) => space,
        Err(code) => return code,
    };
    let contents = match space.file(&key).await {
        Ok(file) => file.contents().await,
        Err(e) => Err(e),
    };
    let contents = match contents {
        Ok(bytes) => bytes,
        Err(e) => return formatter.fail("Failed to read file", &e),
    };

    match write_stdout(&contents) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            ExitCode::GeneralError
        }
    }
}

fn write_stdout(bytes: &[u8]) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .context("Failed to write to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}
