//! preconf CLI - pre-build configuration resolver

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("preconf=debug")
    } else {
        EnvFilter::new("preconf=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color && std::io::stderr().is_terminal();

    match cli.command {
        Commands::Configure(args) => {
            commands::configure::execute(args, &cli.directory, cli.verbose, color)
        }
        Commands::Probe(args) => commands::probe::execute(args, &cli.directory, color),
    }
}
