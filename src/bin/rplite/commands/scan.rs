//! `rplite scan` command

use anyhow::{Context, Result};

use crate::cli::ScanArgs;
use rplite::util::fs::write_string;

pub fn execute(args: ScanArgs) -> Result<()> {
    let scanner = super::scanner(args.project)?;
    let report = scanner.scan_report();
    let stats = report.stats;

    tracing::debug!(
        "{} files scanned, {} ignored, {} failed",
        stats.files_discovered,
        stats.files_ignored,
        stats.files_failed
    );

    let json = if args.pretty {
        report.manifest.to_json_pretty()
    } else {
        report.manifest.to_json()
    }
    .context("failed to serialize manifest")?;

    match args.out {
        Some(path) => {
            write_string(&path, &format!("{}\n", json))?;
            tracing::info!(
                "Wrote {} components to {}",
                stats.components,
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
