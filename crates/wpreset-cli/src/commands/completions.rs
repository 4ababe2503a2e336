//! Completions command - tab completion scripts for `wpreset`

use anyhow::Result;
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

use crate::args::Args as CliArgs;

/// Completions command arguments
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell whose completion script to print
    #[arg(value_enum)]
    pub shell: ShellType,
}

/// Shells `wpreset` can print a completion script for
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    /// Windows PowerShell and pwsh
    Powershell,
    Elvish,
}

impl From<ShellType> for Shell {
    fn from(shell: ShellType) -> Self {
        match shell {
            ShellType::Bash => Shell::Bash,
            ShellType::Zsh => Shell::Zsh,
            ShellType::Fish => Shell::Fish,
            ShellType::Powershell => Shell::PowerShell,
            ShellType::Elvish => Shell::Elvish,
        }
    }
}

/// Print the completion script for the chosen shell to stdout
pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell.into(), &mut io::stdout().lock());
    Ok(())
}

/// Completion script covering every subcommand and its flags
fn write_completions(shell: Shell, out: &mut impl Write) {
    let mut cmd = CliArgs::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
}
