use clap::CommandFactory;
use clap_complete::Shell;
use eyre::Result;
use std::io;

use crate::cli::Cli;

/// Print the completion script for `shell` to stdout
pub fn run(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, &mut io::stdout());
    Ok(())
}
