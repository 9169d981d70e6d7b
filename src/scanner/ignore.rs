//! Ignore patterns for component discovery.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use super::ScanError;
use crate::util::fs::project_relative;

/// Patterns that are always ignored: dependencies, build output, tests and
/// stories.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/.git/**",
    "**/__tests__/**",
    "**/*.test.*",
    "**/*.spec.*",
    "**/*.stories.*",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    pattern: Pattern,
    is_default: bool,
}

/// The pattern that excluded a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnoreMatch<'a> {
    pub pattern: &'a str,
    pub is_default: bool,
}

/// Compiled default and user ignore patterns, evaluated against paths
/// relative to the project root.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    root: PathBuf,
    patterns: Vec<CompiledPattern>,
}

impl IgnoreMatcher {
    pub fn new(root: impl Into<PathBuf>, user_patterns: &[String]) -> Result<Self, ScanError> {
        let mut patterns = Vec::new();

        for source in DEFAULT_IGNORE_PATTERNS {
            patterns.push(compile(source, true)?);
        }
        for source in user_patterns {
            let source = source.trim();
            if source.is_empty() || patterns.iter().any(|p| p.source == source) {
                continue;
            }
            patterns.push(compile(source, false)?);
        }

        Ok(Self {
            root: root.into(),
            patterns,
        })
    }

    /// The first pattern matching `path`, defaults first.
    pub fn matches(&self, path: &Path) -> Option<IgnoreMatch<'_>> {
        let mut relative = project_relative(&self.root, path);
        if relative.is_empty() {
            relative = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        self.patterns
            .iter()
            .find(|p| p.pattern.matches_with(&relative, MATCH_OPTIONS))
            .map(|p| IgnoreMatch {
                pattern: &p.source,
                is_default: p.is_default,
            })
    }

    /// All active patterns with their origin.
    pub fn patterns(&self) -> impl Iterator<Item = (&str, bool)> {
        self.patterns.iter().map(|p| (p.source.as_str(), p.is_default))
    }
}

fn compile(source: &str, is_default: bool) -> Result<CompiledPattern, ScanError> {
    let pattern = Pattern::new(source).map_err(|error| ScanError::InvalidIgnorePattern {
        pattern: source.to_string(),
        source: error,
    })?;
    Ok(CompiledPattern {
        source: source.to_string(),
        pattern,
        is_default,
    })
}
