//! acl command - Public or private access
//!
//! Works on a whole space (alias/space) or a single file (alias/space/key).
//! Only the anonymous-read grant is considered: a target is public when
//! anyone may read it.

use clap::Subcommand;
use serde::Serialize;
use spaces_core::{RemotePath, SpaceHandle};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

use super::{open_space, remote_arg};

/// ACL subcommands
#[derive(Subcommand, Debug)]
pub enum AclCommands {
    /// Show whether a space or file is public
    Get(AclArgs),

    /// Grant anonymous read access
    Public(AclArgs),

    /// Revoke anonymous read access
    Private(AclArgs),
}

/// Target of an acl subcommand
#[derive(clap::Args, Debug)]
pub struct AclArgs {
    /// Space (alias/space) or file (alias/space/key)
    pub path: String,
}

#[derive(Debug, Serialize)]
struct AclOutput {
    target: String,
    public: bool,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Get,
    Set(bool),
}

/// Execute an acl subcommand
pub async fn execute(cmd: AclCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (args, action) = match cmd {
        AclCommands::Get(args) => (args, Action::Get),
        AclCommands::Public(args) => (args, Action::Set(true)),
        AclCommands::Private(args) => (args, Action::Set(false)),
    };

    let path = match remote_arg(&args.path, &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    if path.key.ends_with('/') {
        formatter.error(&format!("'{path}' is a prefix; ACLs apply to a space or a file"));
        return ExitCode::UsageError;
    }

    let space = match open_space(&path, &formatter).await {
        Ok(space) => space,
        Err(code) => return code,
    };

    let public = match apply(&space, &path, action).await {
        Ok(public) => public,
        Err(e) => return formatter.fail("ACL request failed", &e),
    };

    if formatter.is_json() {
        formatter.json(&AclOutput {
            target: path.to_string(),
            public,
        });
    } else {
        let state = if public { "public" } else { "private" };
        match action {
            Action::Get => formatter.println(&format!("{path}: {state}")),
            Action::Set(_) => formatter.success(&format!("'{path}' is now {state}.")),
        }
    }
    ExitCode::Success
}

/// Perform the action and report the resulting state
async fn apply(space: &SpaceHandle, path: &RemotePath, action: Action) -> spaces_core::Result<bool> {
    if path.key.is_empty() {
        match action {
            Action::Get => space.is_public().await,
            Action::Set(true) => space.make_public().await.map(|()| true),
            Action::Set(false) => space.make_private().await.map(|()| false),
        }
    } else {
        let file = space.file(&path.key).await?;
        match action {
            Action::Get => file.is_public().await,
            Action::Set(true) => file.make_public().await.map(|()| true),
            Action::Set(false) => file.make_private().await.map(|()| false),
        }
    }
}
