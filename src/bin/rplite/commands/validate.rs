//! `rplite validate` command

use anyhow::{Context, Result};

use crate::cli::ValidateArgs;
use rplite::util::fs::read_to_string;
use rplite::Manifest;

pub fn execute(args: ValidateArgs) -> Result<()> {
    let payload = read_to_string(&args.file)?;
    let manifest = Manifest::from_json(&payload)
        .with_context(|| format!("invalid manifest {}", args.file.display()))?;

    println!(
        "{}: manifest version {} with {} components",
        args.file.display(),
        manifest.version,
        manifest.components.len()
    );
    for component in &manifest.components {
        tracing::debug!("{} ({} props)", component.identity(), component.props.len());
    }

    Ok(())
}
