//! rplite CLI - browse and preview TypeScript UI components

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use rplite::ScanError;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Overrides the `-v` filter, e.g. `RPLITE_LOG=rplite::scanner=debug`.
const LOG_ENV: &str = "RPLITE_LOG";

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        if let Some(help) = scan_help(&e) {
            eprintln!("help: {}", help);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Preview(args) => commands::preview::execute(args),
        Commands::Completions(args) => commands::completions(args),
    }
}

/// Logs go to stderr; stdout carries manifests and rendered output.
fn init_logging(verbose: bool) {
    let default = if verbose { "rplite=debug" } else { "rplite=info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn scan_help(error: &anyhow::Error) -> Option<String> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ScanError>())
        .and_then(|scan| scan.help())
        .map(|help| help.to_string())
}
