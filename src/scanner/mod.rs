//! Component scanner.
//!
//! A [`Scanner`] turns a source tree into a [`Manifest`]:
//!
//! 1. [`discovery`] walks the source root, applying the [`ignore`] rules.
//! 2. The discovered files and their relative imports are loaded into a
//!    [`Program`].
//! 3. [`exports`] resolves each file's exports into components, classifying
//!    prop types with [`infer`].
//!
//! Per-file resolution runs on the rayon pool; results are collected in
//! discovery order so the manifest is deterministic.

pub mod discovery;
pub mod exports;
pub mod ignore;
pub mod infer;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use miette::Diagnostic as MietteDiagnostic;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{ComponentDefinition, Manifest};
use crate::source::{Program, SourceError};
use crate::util::diagnostic::{Diagnostic, ScanLogger, TracingLogger};
use crate::util::fs::normalize_path;

pub use discovery::{discover_files, Discovered};
pub use exports::{ExportResolver, ResolvedFile};
pub use ignore::{IgnoreMatch, IgnoreMatcher, DEFAULT_IGNORE_PATTERNS};
pub use infer::classify;

/// Errors constructing a [`Scanner`].
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ScanError {
    #[error("invalid ignore pattern `{pattern}`")]
    #[diagnostic(
        code(rplite::scan::ignore_pattern),
        help("ignore patterns are globs relative to the project root, e.g. `src/legacy/**`")
    )]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("source directory not found: {}", path.display())]
    #[diagnostic(code(rplite::scan::missing_source_dir))]
    MissingSourceDir { path: PathBuf },
}

/// How [`Scanner::manifest`] treats repeated calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Rescan on every call.
    #[default]
    Interactive,
    /// Scan once and reuse the result for the scanner's lifetime.
    Batch,
}

pub struct ScannerOptions {
    pub src_dir: PathBuf,
    pub project_root: PathBuf,
    pub ignore: Vec<String>,
    pub logger: Option<Arc<dyn ScanLogger>>,
    pub mode: ScanMode,
}

impl ScannerOptions {
    pub fn new(src_dir: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            src_dir: src_dir.into(),
            project_root: project_root.into(),
            ignore: Vec::new(),
            logger: None,
            mode: ScanMode::default(),
        }
    }

    pub fn ignore(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignore.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn logger(mut self, logger: Arc<dyn ScanLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Counters from one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub files_discovered: usize,
    pub files_ignored: usize,
    pub files_failed: usize,
    pub components: usize,
}

/// A manifest together with the counters of the scan that produced it.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub manifest: Manifest,
    pub stats: ScanStats,
}

pub struct Scanner {
    src_dir: PathBuf,
    project_root: PathBuf,
    matcher: IgnoreMatcher,
    logger: Arc<dyn ScanLogger>,
    mode: ScanMode,
    cache: OnceLock<Arc<Manifest>>,
}

impl Scanner {
    pub fn new(options: ScannerOptions) -> Result<Self, ScanError> {
        let src_dir = normalize_path(&options.src_dir);
        if !src_dir.is_dir() {
            return Err(ScanError::MissingSourceDir { path: src_dir });
        }
        let project_root = normalize_path(&options.project_root);
        let matcher = IgnoreMatcher::new(project_root.clone(), &options.ignore)?;

        Ok(Self {
            src_dir,
            project_root,
            matcher,
            logger: options.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
            mode: options.mode,
            cache: OnceLock::new(),
        })
    }

    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Scan the source tree now, bypassing any cached manifest.
    pub fn scan(&self) -> Manifest {
        self.scan_report().manifest
    }

    /// The current manifest: fresh in interactive mode, computed once in
    /// batch mode.
    pub fn manifest(&self) -> Arc<Manifest> {
        match self.mode {
            ScanMode::Interactive => Arc::new(self.scan()),
            ScanMode::Batch => Arc::clone(self.cache.get_or_init(|| Arc::new(self.scan()))),
        }
    }

    pub fn scan_report(&self) -> ScanReport {
        let logger = self.logger.as_ref();
        let discovered = discover_files(&self.src_dir, &self.matcher, logger);
        tracing::debug!(
            "discovered {} files under {} ({} ignored)",
            discovered.files.len(),
            self.src_dir.display(),
            discovered.ignored
        );

        let outcome = Program::load(&discovered.files);
        let roots: HashSet<&PathBuf> = discovered.files.iter().collect();
        let mut files_failed = 0;
        for (path, error) in &outcome.failures {
            let is_root = roots.contains(path);
            if is_root {
                files_failed += 1;
            }
            logger.log(&failure_diagnostic(path, error, is_root));
        }

        let program = &outcome.program;
        let resolver = ExportResolver::new(program, &self.project_root);
        let resolved: Vec<ResolvedFile> = discovered
            .files
            .par_iter()
            .map(|path| match program.module_id(path) {
                Some(module) => resolver.resolve(module),
                None => ResolvedFile::default(),
            })
            .collect();

        let mut components: Vec<ComponentDefinition> = Vec::new();
        for file in resolved {
            for diagnostic in &file.diagnostics {
                logger.log(diagnostic);
            }
            components.extend(file.components);
        }

        let stats = ScanStats {
            files_discovered: discovered.files.len(),
            files_ignored: discovered.ignored,
            files_failed,
            components: components.len(),
        };
        tracing::debug!("scan found {} components", stats.components);

        ScanReport {
            manifest: Manifest::new(components),
            stats,
        }
    }
}

/// Discovered files that fail are errors; files only reached through an
/// import are warnings.
fn failure_diagnostic(path: &Path, error: &SourceError, is_root: bool) -> Diagnostic {
    let message = match error {
        SourceError::Read { .. } => "Failed to read source file",
        SourceError::Parse(_) => "Failed to parse source file",
    };
    let diagnostic = if is_root {
        Diagnostic::error(message)
    } else {
        Diagnostic::warning(message)
    };
    let detail = match error {
        SourceError::Read { source, .. } => source.to_string(),
        SourceError::Parse(parse) => parse.to_string(),
    };
    diagnostic.with_context("error", detail).with_location(path)
}
