use keystamp::{commands, logging};

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "keystamp",
    about = "Mint and verify signed RSA access tokens",
    version
)]
struct Cli {
    /// Config file (defaults to ~/.config/keystamp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;

    commands::handle_command(cli.command, cli.config.as_deref())
}
