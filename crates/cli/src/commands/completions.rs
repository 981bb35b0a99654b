//! Shell completion generation
//!
//! Prints a completion script for the requested shell to stdout.

use clap::CommandFactory;
use clap_complete::{Generator, Shell};

use super::Cli;
use crate::exit_code::ExitCode;

/// Arguments for the completions command
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Generate shell completions and print to stdout
pub fn execute(args: CompletionsArgs) -> ExitCode {
    let mut cmd = Cli::command();
    print_completions(args.shell, &mut cmd);
    ExitCode::Success
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    clap_complete::generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut std::io::stdout(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(shell: Shell) -> String {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(shell, &mut cmd, "spaces", &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_completions_cover_every_shell() {
        for (shell, marker) in [
            (Shell::Bash, "complete"),
            (Shell::Zsh, "compdef"),
            (Shell::Fish, "complete"),
            (Shell::PowerShell, "Register-ArgumentCompleter"),
        ] {
            let output = render(shell);
            assert!(output.contains("spaces"), "{shell}");
            assert!(output.contains(marker), "{shell}");
        }
    }

    #[test]
    fn test_completions_list_subcommands() {
        let output = render(Shell::Bash);
        for sub in ["cors", "share", "acl"] {
            assert!(output.contains(sub), "missing {sub}");
        }
    }
}
