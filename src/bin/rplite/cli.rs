//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// rplite - discover UI components and preview them with generated controls
#[derive(Parser)]
#[command(name = "rplite")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the source tree and print the component manifest
    Scan(ScanArgs),

    /// Validate a manifest file
    Validate(ValidateArgs),

    /// Render one component with the headless host
    Preview(PreviewArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where to scan. Flags override `rplite.toml`.
#[derive(Args)]
pub struct ProjectArgs {
    /// Project root (paths in the manifest are relative to it)
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Source directory, relative to the project root
    #[arg(long = "src", value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Extra ignore glob, relative to the project root (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,
}

#[derive(Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Pretty-print the manifest
    #[arg(long)]
    pub pretty: bool,

    /// Write the manifest to a file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Manifest JSON file
    pub file: PathBuf,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Component name
    pub component: String,

    /// Pick the named export when a default export shares the name
    #[arg(long, conflicts_with = "default")]
    pub named: bool,

    /// Pick the default export when a named export shares the name
    #[arg(long)]
    pub default: bool,

    /// Set a prop (`key=value`, repeatable)
    #[arg(long = "prop", value_name = "KEY=VALUE")]
    pub props: Vec<String>,

    /// List the component's controls instead of rendering it
    #[arg(long)]
    pub controls: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
