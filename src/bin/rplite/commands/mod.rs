//! Command implementations

pub mod preview;
pub mod scan;
pub mod validate;

use std::io;

use anyhow::{Context, Result};
use clap::CommandFactory;

use crate::cli::{Cli, CompletionsArgs, ProjectArgs};
use rplite::util::config::{global_config_path, load_config, project_config_path, ScanConfig};
use rplite::util::fs::normalize_path;
use rplite::{Config, Scanner, ScannerOptions};

/// Build a scanner from `rplite.toml` (global, then project) and the flags.
pub fn scanner(project: ProjectArgs) -> Result<Scanner> {
    let root = normalize_path(&project.root);

    let mut config = load_config(global_config_path().as_deref(), &project_config_path(&root));
    config.merge(Config {
        scan: ScanConfig {
            src_dir: project.src_dir,
            ignore: project.ignore,
            mode: None,
        },
    });

    let src_dir = root.join(config.src_dir());
    tracing::debug!("scanning {} (project root {})", src_dir.display(), root.display());

    let options = ScannerOptions::new(src_dir, &root)
        .ignore(config.scan.ignore.iter().cloned())
        .mode(config.mode());
    Scanner::new(options).with_context(|| format!("cannot scan project at {}", root.display()))
}

/// `rplite completions`
pub fn completions(args: CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    let bin = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, bin, &mut io::stdout().lock());
    Ok(())
}
